// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Adapters to iterate over paginated list RPCs.
//!
//! List RPCs return one page of results at a time, with an opaque
//! continuation token pointing at the next page. The types in this module
//! hide the token bookkeeping behind lazy, pull-based sequences of pages
//! ([Paginator]) or items ([ItemPaginator]).

use futures::stream::unfold;
use futures::{Stream, StreamExt};
use pin_project::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

/// Describes a response type that can be iterated over with a [Paginator].
pub trait PageableResponse {
    /// The type of the items in the page.
    type PageItem;

    /// Consumes the page, returning its items.
    fn items(self) -> Vec<Self::PageItem>;

    /// The continuation token; empty when there are no further pages.
    fn next_page_token(&self) -> String;
}

/// An adapter that converts a paginated list RPC into a lazy sequence of
/// pages.
///
/// The sequence is finite: it ends when the service returns an empty
/// continuation token, or after the first error. Each call to the underlying
/// RPC happens only when the next page is requested.
#[pin_project]
pub struct Paginator<T, E> {
    #[pin]
    stream: Pin<Box<dyn Stream<Item = Result<T, E>> + Send>>,
}

type ControlFlow = std::ops::ControlFlow<(), String>;

impl<T, E> Paginator<T, E>
where
    T: PageableResponse + Send + 'static,
    T::PageItem: Send + 'static,
    E: Send + 'static,
{
    /// Creates a new [Paginator] given the initial page token and a function
    /// to fetch the next [PageableResponse].
    pub fn new<F>(
        seed_token: String,
        execute: impl Fn(String) -> F + Clone + Send + 'static,
    ) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let stream = unfold(ControlFlow::Continue(seed_token), move |state| {
            let execute = execute.clone();
            async move {
                let token = match state {
                    ControlFlow::Continue(token) => token,
                    ControlFlow::Break(_) => return None,
                };
                match execute(token).await {
                    Ok(page) => {
                        let token = page.next_page_token();
                        let next_state = if token.is_empty() {
                            ControlFlow::Break(())
                        } else {
                            ControlFlow::Continue(token)
                        };
                        Some((Ok(page), next_state))
                    }
                    Err(e) => Some((Err(e), ControlFlow::Break(()))),
                }
            }
        });
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Converts the sequence of pages into a sequence of their items.
    pub fn items(self) -> ItemPaginator<T, E> {
        ItemPaginator::new(self)
    }

    /// Returns the next page in the sequence.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }
}

impl<T, E> Stream for Paginator<T, E> {
    type Item = Result<T, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}

/// An adapter that flattens a [Paginator] into a lazy sequence of items.
///
/// Pages are still fetched one at a time; an error ends the sequence after
/// it is reported.
#[pin_project]
pub struct ItemPaginator<T, E>
where
    T: PageableResponse,
{
    #[pin]
    stream: Pin<Box<dyn Stream<Item = Result<T::PageItem, E>> + Send>>,
}

struct ItemPaginatorState<T, E>
where
    T: PageableResponse,
{
    pages: Paginator<T, E>,
    current: VecDeque<T::PageItem>,
    stopped: bool,
}

impl<T, E> ItemPaginator<T, E>
where
    T: PageableResponse + 'static,
    T::PageItem: 'static,
    E: 'static,
{
    fn new(pages: Paginator<T, E>) -> Self {
        let state = ItemPaginatorState {
            pages,
            current: VecDeque::new(),
            stopped: false,
        };
        let stream = unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.current.pop_front() {
                    return Some((Ok(item), state));
                }
                if state.stopped {
                    return None;
                }
                match state.pages.next().await {
                    None => return None,
                    Some(Err(e)) => {
                        state.stopped = true;
                        return Some((Err(e), state));
                    }
                    Some(Ok(page)) => {
                        state.current = page.items().into();
                    }
                }
            }
        });
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Returns the next item in the sequence.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }
}

impl<T, E> Stream for ItemPaginator<T, E>
where
    T: PageableResponse,
{
    type Item = Result<T::PageItem, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}
