#![allow(dead_code)]

use bugdesk::model::{Issue, Priority, Project, Status, User};
use bugdesk::service::{Identity, Tracker};
use bugdesk::storage::{NewIssue, SqliteStorage};
use bugdesk::util::hash_password;
use bugdesk::validation::RegistrationForm;

pub const PASSWORD: &str = "correct horse";

pub fn user(storage: &mut SqliteStorage, username: &str) -> User {
    let hash = hash_password(PASSWORD).expect("hash password");
    storage
        .create_user(username, &format!("{username}@example.com"), &hash)
        .expect("create user")
}

pub fn project(storage: &mut SqliteStorage, name: &str, owner: &User) -> Project {
    storage
        .create_project(name, None, owner.id)
        .expect("create project")
}

pub fn new_issue(title: &str, project: &Project, reporter: &User) -> NewIssue {
    NewIssue {
        title: title.to_string(),
        description: None,
        status: Status::Open,
        priority: Priority::Medium,
        project_id: project.id,
        reporter_id: reporter.id,
        assignee_id: None,
        due_date: None,
    }
}

pub fn issue(storage: &mut SqliteStorage, title: &str, project: &Project, reporter: &User) -> Issue {
    storage
        .create_issue(&new_issue(title, project, reporter))
        .expect("create issue")
}

pub fn registration(username: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: PASSWORD.to_string(),
        confirm: PASSWORD.to_string(),
    }
}

/// Register through the service and return the identity to act as.
pub fn register(tracker: &mut Tracker, username: &str) -> Identity {
    let user = tracker.register(&registration(username)).expect("register");
    Identity::new(user.id)
}
