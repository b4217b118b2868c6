use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use club_data::{
    Announcement, AnnouncementFilter, Delete, Event, EventFilter, EventParticipant, HomeSummary,
    Insert, Member, MemberFilter, Operation, Payment, Project, Query, Response, Result, Retrieve,
    Session, Update,
};

/// The operations guarding each kind of record
pub trait Guarded {
    const VIEW: Operation;
    const ADD: Operation;
    const EDIT: Operation;
    const DELETE: Operation;

    /// Set for private records: sessions without this operation
    /// only see the records they own
    const VIEW_ALL: Option<Operation> = None;

    /// The member a record belongs to
    fn owner(&self) -> Option<u32> {
        None
    }
}

impl Guarded for Member {
    const VIEW: Operation = Operation::ViewMembers;
    const ADD: Operation = Operation::AddMember;
    const EDIT: Operation = Operation::EditMember;
    const DELETE: Operation = Operation::DeleteMember;
}

impl Guarded for Payment {
    const VIEW: Operation = Operation::ViewPayments;
    const ADD: Operation = Operation::AddPayment;
    const EDIT: Operation = Operation::EditPayment;
    const DELETE: Operation = Operation::DeletePayment;
    const VIEW_ALL: Option<Operation> = Some(Operation::ListAllPayments);

    fn owner(&self) -> Option<u32> {
        Some(self.member_id)
    }
}

impl Guarded for Event {
    const VIEW: Operation = Operation::ViewEvents;
    const ADD: Operation = Operation::CreateEvent;
    const EDIT: Operation = Operation::EditEvent;
    const DELETE: Operation = Operation::DeleteEvent;
}

impl Guarded for EventParticipant {
    const VIEW: Operation = Operation::ViewMembers;
    const ADD: Operation = Operation::RegisterForEvent;
    const EDIT: Operation = Operation::EditEvent;
    const DELETE: Operation = Operation::RegisterForEvent;

    fn owner(&self) -> Option<u32> {
        Some(self.member_id)
    }
}

impl Guarded for Project {
    const VIEW: Operation = Operation::ViewProjects;
    const ADD: Operation = Operation::AddProject;
    const EDIT: Operation = Operation::EditProject;
    const DELETE: Operation = Operation::DeleteProject;
}

impl Guarded for Response {
    const VIEW: Operation = Operation::ViewResponses;
    const ADD: Operation = Operation::AddResponse;
    const EDIT: Operation = Operation::EditResponse;
    const DELETE: Operation = Operation::DeleteResponse;

    fn owner(&self) -> Option<u32> {
        Some(self.member_id)
    }
}

impl Guarded for Announcement {
    const VIEW: Operation = Operation::ViewAnnouncements;
    const ADD: Operation = Operation::AddAnnouncement;
    const EDIT: Operation = Operation::EditAnnouncement;
    const DELETE: Operation = Operation::DeleteAnnouncement;
}

/// A store seen through a session. Every operation is checked
/// against the session before it reaches the store.
pub struct Authorized<'a, DB> {
    db: &'a DB,
    session: &'a Session,
}

impl<'a, DB> Authorized<'a, DB> {
    pub fn new(db: &'a DB, session: &'a Session) -> Self {
        Self { db, session }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    fn authorize(&self, operation: Operation) -> Result<()> {
        self.session.authorize(operation).map_err(|err| {
            warn!(session = %self.session, "{}", err);
            err
        })
    }

    /// Private records the session may not see all of
    /// have to be owned by the session's member
    fn sees_only_own<T: Guarded>(&self) -> Option<Operation> {
        T::VIEW_ALL.filter(|op| !self.session.allows(*op))
    }

    fn owns(&self, owner: Option<u32>) -> bool {
        owner.is_some() && owner == self.session.member_id()
    }

    fn authorize_owned(&self, operation: Operation, owner: Option<u32>) -> Result<()> {
        let result = match owner {
            Some(owner) => self.session.authorize_owned(operation, owner),
            None => self.session.authorize(operation),
        };
        result.map_err(|err| {
            warn!(session = %self.session, owner, "{}", err);
            err
        })
    }
}

impl<'a, DB> Authorized<'a, DB>
where
    DB: Query<Member, Filter = MemberFilter>
        + Query<Event, Filter = EventFilter>
        + Query<Announcement, Filter = AnnouncementFilter>
        + Sync,
{
    /// The home page counts. Visible to everyone.
    pub async fn summary(&self, today: NaiveDate) -> Result<HomeSummary> {
        self.authorize(Operation::ViewHome)?;
        HomeSummary::collect(self.db, today).await
    }
}

#[async_trait]
impl<'a, DB, T> Query<T> for Authorized<'a, DB>
where
    DB: Query<T> + Sync,
    <DB as Query<T>>::Filter: Sync,
    T: Guarded + Send + 'static,
{
    type Filter = <DB as Query<T>>::Filter;

    /// Private records are narrowed down to the ones owned
    /// by the session unless it may view all of them.
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>> {
        self.authorize(T::VIEW)?;
        let mut items = <DB as Query<T>>::query(self.db, filter).await?;
        if self.sees_only_own::<T>().is_some() {
            items.retain(|item| self.owns(item.owner()));
        }
        Ok(items)
    }
}

#[async_trait]
impl<'a, DB, T> Retrieve<T> for Authorized<'a, DB>
where
    DB: Retrieve<T> + Sync,
    <DB as Retrieve<T>>::Key: Send + 'static,
    T: Guarded + Send + 'static,
{
    type Key = <DB as Retrieve<T>>::Key;

    async fn retrieve(&self, key: Self::Key) -> Result<T> {
        self.authorize(T::VIEW)?;
        let item = <DB as Retrieve<T>>::retrieve(self.db, key).await?;
        if let Some(view_all) = self.sees_only_own::<T>() {
            if !self.owns(item.owner()) {
                self.authorize(view_all)?;
            }
        }
        Ok(item)
    }
}

#[async_trait]
impl<'a, DB, T> Insert<T> for Authorized<'a, DB>
where
    DB: Insert<T> + Sync,
    T: Guarded + Send + 'static,
{
    /// Records with an owner can only be created for
    /// the session's own member unless it is an admin.
    async fn insert(&self, item: T) -> Result<T> {
        self.authorize_owned(T::ADD, item.owner())?;
        <DB as Insert<T>>::insert(self.db, item).await
    }
}

#[async_trait]
impl<'a, DB, T> Update<T> for Authorized<'a, DB>
where
    DB: Update<T> + Sync,
    <DB as Update<T>>::Key: Send + 'static,
    <DB as Update<T>>::Changes: Send + 'static,
    T: Guarded + Send + 'static,
{
    type Key = <DB as Update<T>>::Key;
    type Changes = <DB as Update<T>>::Changes;

    async fn update(&self, key: Self::Key, changes: Self::Changes) -> Result<T> {
        self.authorize(T::EDIT)?;
        <DB as Update<T>>::update(self.db, key, changes).await
    }
}

#[async_trait]
impl<'a, DB, T> Delete<T> for Authorized<'a, DB>
where
    DB: Delete<T, Key = u32> + Retrieve<T, Key = u32> + Sync,
    T: Guarded + Send + 'static,
{
    type Key = u32;

    async fn delete(&self, key: u32) -> Result<T> {
        self.authorize(T::DELETE)?;
        if !self.session.is_admin() {
            let item = <DB as Retrieve<T>>::retrieve(self.db, key).await?;
            self.authorize_owned(T::DELETE, item.owner())?;
        }
        <DB as Delete<T>>::delete(self.db, key).await
    }
}
