use serde::Serialize;

/// One page of results
///
/// Items are always in the paginator's natural ordering, whichever way the
/// page was read. A missing token means there is nothing to navigate to in
/// that direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    #[serde(rename = "previous")]
    previous_token: Option<String>,
    #[serde(rename = "next")]
    next_token: Option<String>,
}

impl<T> Page<T> {
    pub(crate) fn new(
        items: Vec<T>,
        previous_token: Option<String>,
        next_token: Option<String>,
    ) -> Self {
        Self {
            items,
            previous_token,
            next_token,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn previous_token(&self) -> Option<&str> {
        self.previous_token.as_deref()
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_token.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next_token.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Split into `(items, previous_token, next_token)`
    pub fn into_parts(self) -> (Vec<T>, Option<String>, Option<String>) {
        (self.items, self.previous_token, self.next_token)
    }

    /// Transform the items, keeping the links
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            previous_token: self.previous_token,
            next_token: self.next_token,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
