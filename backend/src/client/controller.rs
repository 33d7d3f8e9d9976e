//! List/detail controllers driving the management screens.
//!
//! A [`ListController`] holds the last fetched collection and a free-text
//! filter. A [`ResourceController`] pairs it with an [`ApiClient`] and keeps
//! the held list in step with successful mutations: deletes splice the item
//! out, updates swap in the server's copy, creates refetch. Failed mutations
//! leave the held list untouched.

use std::borrow::Cow;

use crate::domain::{Account, Course, EnrollmentView, Principal, Role, Student, Teacher};

use super::api::{ApiClient, ClientError, Remote};
use serde_json::Value;

/// Text a record exposes to the list filter.
pub trait Searchable {
    /// Fields matched case-insensitively against the filter text.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(format!("{} {}", self.profile.firstname, self.profile.lastname)),
            Cow::Borrowed(self.profile.grade.as_str()),
            Cow::Borrowed(self.profile.email.as_str()),
        ]
    }
}

impl Searchable for Teacher {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.profile.firstname.as_str()),
            Cow::Borrowed(self.profile.lastname.as_str()),
            Cow::Borrowed(self.profile.subject.as_str()),
            Cow::Borrowed(self.profile.email.as_str()),
        ]
    }
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.draft.title.as_str()),
            Cow::Borrowed(self.draft.course_code.as_str()),
        ]
    }
}

impl Searchable for Account {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.first_name.as_str()),
            Cow::Borrowed(self.email.as_str()),
        ]
    }
}

impl Searchable for EnrollmentView {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.student_first_name.as_str()),
            Cow::Borrowed(self.teacher_first_name.as_str()),
            Cow::Borrowed(self.course_title.as_str()),
            Cow::Borrowed(self.completion_status.as_str()),
        ]
    }
}

/// Fetched records plus the current filter text.
#[derive(Debug, Clone)]
pub struct ListController<T> {
    items: Vec<T>,
    filter: String,
}

impl<T> Default for ListController<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filter: String::new(),
        }
    }
}

impl<T: Searchable> ListController<T> {
    /// Empty list with no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held records with a fresh fetch.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Every held record, ignoring the filter.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Set the filter text; blank text shows every record.
    ///
    /// ```
    /// use std::borrow::Cow;
    ///
    /// use schoolapp::client::controller::{ListController, Searchable};
    ///
    /// struct Name(&'static str);
    ///
    /// impl Searchable for Name {
    ///     fn search_fields(&self) -> Vec<Cow<'_, str>> {
    ///         vec![Cow::Borrowed(self.0)]
    ///     }
    /// }
    ///
    /// let mut list = ListController::new();
    /// list.replace_all(vec![Name("Ann Lee"), Name("Tom Hardy")]);
    /// list.set_filter("HARD");
    /// assert_eq!(list.filter(), "HARD");
    /// assert_eq!(list.visible().len(), 1);
    /// list.set_filter("  ");
    /// assert_eq!(list.visible().len(), 2);
    /// ```
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Current filter text.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Records with a search field containing the filter, case-insensitively.
    /// A blank filter shows everything.
    #[must_use]
    pub fn visible(&self) -> Vec<&T> {
        let needle = self.filter.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || item
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Drop the first record matching `pred`; `true` when one was removed.
    pub fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        match self.items.iter().position(pred) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swap the first record matching `pred` for `item`.
    pub fn replace_where(&mut self, pred: impl Fn(&T) -> bool, item: T) -> bool {
        match self.items.iter_mut().find(|current| pred(current)) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

impl ListController<Account> {
    /// [`ListController::visible`] narrowed to one role.
    #[must_use]
    pub fn visible_with_role(&self, role: Option<Role>) -> Vec<&Account> {
        self.visible()
            .into_iter()
            .filter(|account| role.is_none_or(|role| account.role == role))
            .collect()
    }
}

/// One collection screen: fetch, filter, inspect and mutate.
pub struct ResourceController<R: Remote> {
    client: ApiClient,
    scope: R::Filter,
    list: ListController<R>,
}

impl<R: Remote + Searchable> ResourceController<R> {
    /// Controller listing the records selected by `scope`.
    #[must_use]
    pub fn new(client: ApiClient, scope: R::Filter) -> Self {
        Self {
            client,
            scope,
            list: ListController::new(),
        }
    }

    /// Controller scoped the way the server scopes `principal`.
    #[must_use]
    pub fn for_principal(client: ApiClient, principal: &Principal) -> Self {
        Self::new(client, R::scope_for(principal).unwrap_or_default())
    }

    /// Records held for this resource.
    #[must_use]
    pub fn list(&self) -> &ListController<R> {
        &self.list
    }

    /// Mutable access, for editing the filter.
    pub fn list_mut(&mut self) -> &mut ListController<R> {
        &mut self.list
    }

    /// Refetch the collection.
    ///
    /// # Errors
    /// Client failures; the held list is kept.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let items = self.client.list::<R>(&self.scope).await?;
        self.list.replace_all(items);
        Ok(())
    }

    /// Fetch one record.
    ///
    /// # Errors
    /// Client failures, including `404`.
    pub async fn detail(&self, id: R::Id) -> Result<R, ClientError> {
        self.client.get::<R>(id).await
    }

    /// Delete `id` and splice it out of the held list.
    ///
    /// # Errors
    /// Client failures; nothing is removed locally.
    pub async fn delete(&mut self, id: R::Id) -> Result<String, ClientError> {
        let message = self.client.delete::<R>(id).await?;
        self.list.remove_where(|item| item.id() == id);
        Ok(message)
    }

    /// Replace `id` with `body` and hold the server's copy.
    ///
    /// # Errors
    /// Client failures; the held record is unchanged.
    pub async fn update(&mut self, id: R::Id, body: &Value) -> Result<String, ClientError> {
        let saved = self.client.update::<R>(id, body).await?;
        self.list.replace_where(|item| item.id() == id, saved.record);
        Ok(saved.message)
    }

    /// Create a record, then refetch so ordering matches the server.
    ///
    /// # Errors
    /// Client failures from either call.
    pub async fn create(&mut self, body: &Value) -> Result<String, ClientError> {
        let saved = self.client.create::<R>(body).await?;
        self.refresh().await?;
        Ok(saved.message)
    }
}
