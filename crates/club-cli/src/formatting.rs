use std::fmt::Display;

use club_data::{
    Announcement, Event, EventParticipant, HomeSummary, Member, Payment, Project, Response,
    Session,
};

macro_rules! next_attr {
    ($old:ident, $new:ident) => {
        if $old != $new {
            format!(" -> {}", $new)
        } else {
            "".to_string()
        }
    };
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", $new.$attr)
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn or_none<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

impl PrintFormatted for Member {
    fn print_formatted(&self) {
        println!("Name:\t\t\t{}", self.full_name());
        println!("Email:\t\t\t{}", self.email);
        println!("Birth date:\t\t{}", or_none(&self.birth_date));
        println!("Role:\t\t\t{}", self.role);
        println!("Status:\t\t\t{}", self.status);
        println!("Joined:\t\t\t{}", self.join_date);
        let password = if self.password.is_some() { "set" } else { "not set" };
        println!("Password:\t\t{}", password);
    }
}

impl PrintFormatted for (Member, Member) {
    fn print_formatted(&self) {
        let (old, new) = self;
        let birth_date_old = or_none(&old.birth_date);
        let birth_date_new = or_none(&new.birth_date);

        let next_first_name = next_attr!(old, new, first_name);
        println!("First name:\t\t{}{}", old.first_name, next_first_name);
        let next_last_name = next_attr!(old, new, last_name);
        println!("Last name:\t\t{}{}", old.last_name, next_last_name);
        let next_email = next_attr!(old, new, email);
        println!("Email:\t\t\t{}{}", old.email, next_email);
        let next_birth_date = next_attr!(birth_date_old, birth_date_new);
        println!("Birth date:\t\t{}{}", birth_date_old, next_birth_date);
        let next_role = next_attr!(old, new, role);
        println!("Role:\t\t\t{}{}", old.role, next_role);
        let next_status = next_attr!(old, new, status);
        println!("Status:\t\t\t{}{}", old.status, next_status);
        let next_join_date = next_attr!(old, new, join_date);
        println!("Joined:\t\t\t{}{}", old.join_date, next_join_date);
        if old.password != new.password {
            println!("Password:\t\tchanged");
        }
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<30}\t{:<30}\t{:<8}\t{:<10}\t{}",
            "ID", "Name", "Email", "Role", "Status", "Joined"
        );
        println!("{:-<120}", "-");
        for member in self {
            println!(
                "{:>4}\t{:<30}\t{:<30}\t{:<8}\t{:<10}\t{}",
                member.id,
                member.full_name(),
                member.email,
                member.role,
                member.status,
                member.join_date
            );
        }
    }
}

impl PrintFormatted for Payment {
    fn print_formatted(&self) {
        println!("Member:\t\t\t{}", self.member_id);
        println!("Amount:\t\t\t{:.2}", self.amount);
        println!("Date:\t\t\t{}", self.date);
        println!("Method:\t\t\t{}", or_none(&self.method));
        println!("Note:\t\t\t{}", or_none(&self.note));
    }
}

impl PrintFormatted for Vec<Payment> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<12}\t{:>6}\t{:>10}\t{:<12}\t{}",
            "ID", "Date", "Member", "Amount", "Method", "Note"
        );
        println!("{:-<100}", "-");
        for payment in self {
            println!(
                "{:>4}\t{:<12}\t{:>6}\t{:>10.2}\t{:<12}\t{}",
                payment.id,
                payment.date,
                payment.member_id,
                payment.amount,
                payment.method.as_deref().unwrap_or(""),
                payment.note.as_deref().unwrap_or("")
            );
        }
        let total: f64 = self.iter().map(|p| p.amount).sum();
        println!("{:-<100}", "-");
        println!("{:>4}\t{:<12}\t{:>6}\t{:>10.2}", "", "Total", "", total);
    }
}

impl PrintFormatted for Event {
    fn print_formatted(&self) {
        let capacity = if self.capacity == 0 {
            "unlimited".to_string()
        } else {
            self.capacity.to_string()
        };
        println!("Title:\t\t\t{}", self.title);
        println!("Date:\t\t\t{}", self.date);
        println!("Location:\t\t{}", or_none(&self.location));
        println!("Capacity:\t\t{}", capacity);
        println!("Responsible:\t\t{}", or_none(&self.responsible_member_id));
        if let Some(description) = &self.description {
            println!();
            println!("{}", description);
        }
    }
}

impl PrintFormatted for Vec<Event> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<12}\t{:<30}\t{:<24}\t{:>8}",
            "ID", "Date", "Title", "Location", "Capacity"
        );
        println!("{:-<100}", "-");
        for event in self {
            println!(
                "{:>4}\t{:<12}\t{:<30}\t{:<24}\t{:>8}",
                event.id,
                event.date,
                event.title,
                event.location.as_deref().unwrap_or(""),
                event.capacity
            );
        }
    }
}

impl PrintFormatted for Vec<(EventParticipant, Member)> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<20}\t{:<30}\t{}", "ID", "Registered", "Name", "Email");
        println!("{:-<100}", "-");
        for (participant, member) in self {
            println!(
                "{:>4}\t{:<20}\t{:<30}\t{}",
                participant.id,
                participant.registered_at.format("%Y-%m-%d %H:%M"),
                member.full_name(),
                member.email
            );
        }
    }
}

impl PrintFormatted for EventParticipant {
    fn print_formatted(&self) {
        println!("Event:\t\t\t{}", self.event_id);
        println!("Member:\t\t\t{}", self.member_id);
        println!("Registered:\t\t{}", self.registered_at.format("%Y-%m-%d %H:%M"));
    }
}

impl PrintFormatted for Project {
    fn print_formatted(&self) {
        println!("Title:\t\t\t{}", self.title);
        println!("Start:\t\t\t{}", or_none(&self.start_date));
        println!("End:\t\t\t{}", or_none(&self.end_date));
        println!("Responsible:\t\t{}", or_none(&self.responsible_member_id));
        if let Some(description) = &self.description {
            println!();
            println!("{}", description);
        }
    }
}

impl PrintFormatted for Vec<Project> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<30}\t{:<12}\t{:<12}\t{}",
            "ID", "Title", "Start", "End", "Responsible"
        );
        println!("{:-<100}", "-");
        for project in self {
            println!(
                "{:>4}\t{:<30}\t{:<12}\t{:<12}\t{}",
                project.id,
                project.title,
                or_none(&project.start_date),
                or_none(&project.end_date),
                or_none(&project.responsible_member_id)
            );
        }
    }
}

impl PrintFormatted for Response {
    fn print_formatted(&self) {
        println!("Member:\t\t\t{}", self.member_id);
        println!("Project:\t\t{}", or_none(&self.target_project_id));
        println!("Date:\t\t\t{}", self.date.format("%Y-%m-%d %H:%M"));
        println!();
        println!("{}", self.content);
    }
}

impl PrintFormatted for Vec<Response> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<20}\t{:>6}\t{:>7}\t{}",
            "ID", "Date", "Member", "Project", "Content"
        );
        println!("{:-<100}", "-");
        for response in self {
            let project = response
                .target_project_id
                .map(|id| id.to_string())
                .unwrap_or_default();
            println!(
                "{:>4}\t{:<20}\t{:>6}\t{:>7}\t{}",
                response.id,
                response.date.format("%Y-%m-%d %H:%M"),
                response.member_id,
                project,
                response.content.lines().next().unwrap_or("")
            );
        }
    }
}

impl PrintFormatted for Announcement {
    fn print_formatted(&self) {
        println!("{}", self.title);
        println!(
            "{} by {}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.author.as_deref().unwrap_or("unknown")
        );
        println!();
        println!("{}", self.content);
    }
}

impl PrintFormatted for Vec<Announcement> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<20}\t{:<24}\t{}", "ID", "Date", "Author", "Title");
        println!("{:-<100}", "-");
        for announcement in self {
            println!(
                "{:>4}\t{:<20}\t{:<24}\t{}",
                announcement.id,
                announcement.date.format("%Y-%m-%d %H:%M"),
                announcement.author.as_deref().unwrap_or(""),
                announcement.title
            );
        }
    }
}

impl PrintFormatted for HomeSummary {
    fn print_formatted(&self) {
        println!(
            "Members:\t\t{} ({} active)",
            self.total_members, self.active_members
        );
        println!("Announcements:\t\t{}", self.announcements);
        println!("Upcoming events:\t{}", self.upcoming_events.len());
        if !self.upcoming_events.is_empty() {
            println!();
            self.upcoming_events.print_formatted();
        }
    }
}

impl PrintFormatted for Session {
    fn print_formatted(&self) {
        println!("Session:\t\t{}", self);
        println!("Access:\t\t\t{}", self.access());
        println!();
        println!("Permitted:");
        for operation in self.permitted() {
            println!("  {}", operation);
        }
    }
}
