// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Walks paginated Reddit listings.

/// Number of items requested per page.
pub const PAGE_SIZE: usize = 100;

/// One page of a listing along with the cursor for the next page.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub after: Option<String>,
}

/// Collects every item from a paginated listing.
///
/// `fetch` is called with the cursor of the page to retrieve (`None` for the
/// first page). Paging stops when there is no next cursor, when a page comes
/// back empty, when the same cursor is returned twice, or as soon as
/// `keep_going` returns false for an item. The item that failed `keep_going`
/// is not included.
pub async fn paginate<T, E, F, Fut>(
    mut fetch: F,
    mut keep_going: impl FnMut(&T) -> bool,
) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.clone()).await?;
        if page.items.is_empty() {
            break;
        }

        for item in page.items {
            if !keep_going(&item) {
                return Ok(items);
            }
            items.push(item);
        }

        match page.after {
            Some(after) if cursor.as_ref() != Some(&after) => cursor = Some(after),
            _ => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::future::ready;

    fn pages() -> Vec<Page<u32>> {
        vec![
            Page {
                items: vec![1, 2],
                after: Some(String::from("a")),
            },
            Page {
                items: vec![3, 4],
                after: Some(String::from("b")),
            },
            Page {
                items: vec![5],
                after: None,
            },
        ]
    }

    #[tokio::test]
    async fn it_follows_cursors_until_the_last_page() {
        let pages = RefCell::new(pages().into_iter());
        let cursors = RefCell::new(Vec::new());
        let items: Vec<u32> = paginate(
            |cursor| {
                cursors.borrow_mut().push(cursor);
                ready(Ok::<_, ()>(pages.borrow_mut().next().unwrap()))
            },
            |_| true,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *cursors.borrow(),
            vec![None, Some(String::from("a")), Some(String::from("b"))]
        );
    }

    #[tokio::test]
    async fn it_stops_when_told_to() {
        let pages = RefCell::new(pages().into_iter());
        let items: Vec<u32> = paginate(
            |_| ready(Ok::<_, ()>(pages.borrow_mut().next().unwrap())),
            |n| *n < 3,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn it_stops_on_an_empty_page() {
        let items: Vec<u32> = paginate(
            |_| {
                ready(Ok::<_, ()>(Page {
                    items: vec![],
                    after: Some(String::from("a")),
                }))
            },
            |_| true,
        )
        .await
        .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn it_stops_on_a_repeated_cursor() {
        let calls = RefCell::new(0);
        let items: Vec<u32> = paginate(
            |_| {
                *calls.borrow_mut() += 1;
                ready(Ok::<_, ()>(Page {
                    items: vec![7],
                    after: Some(String::from("same")),
                }))
            },
            |_| true,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![7, 7]);
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn it_propagates_errors() {
        let result: Result<Vec<u32>, &str> = paginate(|_| ready(Err("boom")), |_| true).await;
        assert_eq!(result.unwrap_err(), "boom");
    }
}
