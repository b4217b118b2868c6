use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Role};

/// Privilege levels, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Anonymous,
    Member,
    Admin,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Access::Anonymous => "anonymous",
            Access::Member => "member",
            Access::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

/// Every operation that is subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    ViewHome,
    ViewEvents,

    ViewMembers,
    ViewPayments,
    AddPayment,
    ViewAnnouncements,
    AddAnnouncement,
    ViewProjects,
    ViewResponses,
    AddResponse,
    RegisterForEvent,

    ListAllPayments,
    EditPayment,
    DeletePayment,
    AddMember,
    EditMember,
    DeleteMember,
    CreateEvent,
    EditEvent,
    DeleteEvent,
    EditAnnouncement,
    DeleteAnnouncement,
    AddProject,
    EditProject,
    DeleteProject,
    EditResponse,
    DeleteResponse,
}

impl Operation {
    pub const ALL: [Operation; 27] = [
        Operation::ViewHome,
        Operation::ViewEvents,
        Operation::ViewMembers,
        Operation::ViewPayments,
        Operation::AddPayment,
        Operation::ViewAnnouncements,
        Operation::AddAnnouncement,
        Operation::ViewProjects,
        Operation::ViewResponses,
        Operation::AddResponse,
        Operation::RegisterForEvent,
        Operation::ListAllPayments,
        Operation::EditPayment,
        Operation::DeletePayment,
        Operation::AddMember,
        Operation::EditMember,
        Operation::DeleteMember,
        Operation::CreateEvent,
        Operation::EditEvent,
        Operation::DeleteEvent,
        Operation::EditAnnouncement,
        Operation::DeleteAnnouncement,
        Operation::AddProject,
        Operation::EditProject,
        Operation::DeleteProject,
        Operation::EditResponse,
        Operation::DeleteResponse,
    ];

    /// The minimum access level needed to perform the operation.
    pub fn required(&self) -> Access {
        use Operation::*;
        match self {
            ViewHome | ViewEvents => Access::Anonymous,

            ViewMembers | ViewPayments | AddPayment | ViewAnnouncements | AddAnnouncement
            | ViewProjects | ViewResponses | AddResponse | RegisterForEvent => Access::Member,

            ListAllPayments | EditPayment | DeletePayment | AddMember | EditMember
            | DeleteMember | CreateEvent | EditEvent | DeleteEvent | EditAnnouncement
            | DeleteAnnouncement | AddProject | EditProject | DeleteProject | EditResponse
            | DeleteResponse => Access::Admin,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operation::*;
        let name = match self {
            ViewHome => "viewing the home summary",
            ViewEvents => "viewing events",
            ViewMembers => "viewing members",
            ViewPayments => "viewing payments",
            AddPayment => "adding a payment",
            ViewAnnouncements => "viewing announcements",
            AddAnnouncement => "publishing an announcement",
            ViewProjects => "viewing projects",
            ViewResponses => "viewing responses",
            AddResponse => "adding a response",
            RegisterForEvent => "registering for an event",
            ListAllPayments => "listing all payments",
            EditPayment => "editing a payment",
            DeletePayment => "deleting a payment",
            AddMember => "adding a member",
            EditMember => "editing a member",
            DeleteMember => "deleting a member",
            CreateEvent => "creating an event",
            EditEvent => "editing an event",
            DeleteEvent => "deleting an event",
            EditAnnouncement => "editing an announcement",
            DeleteAnnouncement => "deleting an announcement",
            AddProject => "adding a project",
            EditProject => "editing a project",
            DeleteProject => "deleting a project",
            EditResponse => "editing a response",
            DeleteResponse => "deleting a response",
        };
        write!(f, "{}", name)
    }
}

/// Who is making a request. Passed explicitly into every guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Session {
    #[default]
    Anonymous,
    Member {
        member_id: u32,
        role: Role,
    },
    /// The shared admin credential. Not tied to a member row.
    Admin,
}

impl Session {
    pub fn access(&self) -> Access {
        match self {
            Session::Anonymous => Access::Anonymous,
            Session::Member {
                role: Role::Admin, ..
            } => Access::Admin,
            Session::Member { .. } => Access::Member,
            Session::Admin => Access::Admin,
        }
    }

    /// The member this session is bound to, if any
    pub fn member_id(&self) -> Option<u32> {
        match self {
            Session::Member { member_id, .. } => Some(*member_id),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.access() == Access::Admin
    }

    pub fn allows(&self, operation: Operation) -> bool {
        self.access() >= operation.required()
    }

    /// All operations this session may perform
    pub fn permitted(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.allows(*op))
            .collect()
    }

    pub fn authorize(&self, operation: Operation) -> Result<()> {
        if self.allows(operation) {
            Ok(())
        } else {
            Err(Error::Forbidden {
                operation,
                required: operation.required(),
            })
        }
    }

    /// Authorize an operation on a row owned by `owner`.
    /// Without admin access a session may only act on its own rows.
    pub fn authorize_owned(&self, operation: Operation, owner: u32) -> Result<()> {
        self.authorize(operation)?;
        if self.is_admin() || self.member_id() == Some(owner) {
            Ok(())
        } else {
            Err(Error::Forbidden {
                operation,
                required: Access::Admin,
            })
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Anonymous => write!(f, "anonymous"),
            Session::Member { member_id, role } => write!(f, "member {} ({})", member_id, role),
            Session::Admin => write!(f, "admin"),
        }
    }
}
