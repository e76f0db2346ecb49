//! End-to-end CLI tests: the `bugdesk` binary in a temp workspace.

mod common;

use common::cli::{BugdeskWorkspace, run_bugdesk, run_bugdesk_with_env};
use predicates::prelude::*;
use std::fs;

fn register(ws: &BugdeskWorkspace, name: &str) -> i64 {
    let email = format!("{name}@example.com");
    let run = run_bugdesk(
        ws,
        [
            "user",
            "register",
            "--username",
            name,
            "--email",
            &email,
            "--password",
            "pw",
            "--confirm",
            "pw",
            "--json",
        ],
        &format!("register_{name}"),
    );
    assert!(run.status.success(), "register failed: {}", run.stderr);
    run.json()["id"].as_i64().expect("user id")
}

fn create_project(ws: &BugdeskWorkspace, actor: &str, name: &str) -> i64 {
    let run = run_bugdesk(
        ws,
        ["project", "create", name, "--actor", actor, "--json"],
        "create_project",
    );
    assert!(run.status.success(), "project create failed: {}", run.stderr);
    run.json()["id"].as_i64().expect("project id")
}

fn create_issue(ws: &BugdeskWorkspace, actor: &str, project_id: i64, title: &str) -> i64 {
    let project = project_id.to_string();
    let run = run_bugdesk(
        ws,
        ["issue", "create", &project, title, "--actor", actor, "--json"],
        "create_issue",
    );
    assert!(run.status.success(), "issue create failed: {}", run.stderr);
    run.json()["issue"]["id"].as_i64().expect("issue id")
}

#[test]
fn init_creates_workspace_and_refuses_twice() {
    let ws = BugdeskWorkspace::new();
    let run = run_bugdesk(&ws, ["init"], "init");
    assert!(run.status.success(), "init failed: {}", run.stderr);
    assert!(predicate::str::contains("Initialized bugdesk workspace").eval(&run.stdout));
    assert!(ws.root.join(".bugdesk/bugdesk.db").exists());

    let again = run_bugdesk(&ws, ["init"], "init_again");
    assert_eq!(again.status.code(), Some(2));
    assert_eq!(again.error_json()["error"]["code"], "ALREADY_INITIALIZED");
}

#[test]
fn commands_outside_workspace_are_not_initialized() {
    let ws = BugdeskWorkspace::new();
    let run = run_bugdesk(&ws, ["project", "list"], "project_list_uninit");
    assert_eq!(run.status.code(), Some(2));
    assert_eq!(run.error_json()["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn full_issue_lifecycle() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");
    let bob_id = register(&ws, "bob");
    let project_id = create_project(&ws, "alice", "Website");
    let issue_id = create_issue(&ws, "alice", project_id, "Login fails");
    let issue = issue_id.to_string();
    let bob = bob_id.to_string();

    let edit = run_bugdesk(
        &ws,
        [
            "issue", "edit", &issue, "--status", "In Progress", "--assignee", &bob, "--actor",
            "alice", "--json",
        ],
        "edit",
    );
    assert!(edit.status.success(), "edit failed: {}", edit.stderr);
    assert_eq!(
        edit.json()["detail"],
        "status: Open -> In Progress; assignee: Unassigned -> bob"
    );

    let comment = run_bugdesk(
        &ws,
        ["comment", "add", &issue, "Reproduced", "on", "staging", "--actor", "bob"],
        "comment",
    );
    assert!(comment.status.success(), "comment failed: {}", comment.stderr);

    let show = run_bugdesk(&ws, ["issue", "show", &issue, "--json"], "show");
    assert!(show.status.success());
    let detail = show.json();
    assert_eq!(detail["issue"]["status"], "In Progress");
    assert_eq!(detail["comments"][0]["content"], "Reproduced on staging");
    let actions: Vec<&str> = detail["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["Created", "Updated", "Commented"]);

    let text = run_bugdesk(&ws, ["issue", "show", &issue], "show_text");
    assert!(predicate::str::contains("Assignee: bob").eval(&text.stdout));

    let delete = run_bugdesk(&ws, ["issue", "delete", &issue, "--actor", "alice"], "delete");
    assert!(delete.status.success(), "delete failed: {}", delete.stderr);

    let gone = run_bugdesk(&ws, ["issue", "show", &issue], "show_deleted");
    assert_eq!(gone.status.code(), Some(3));
    assert_eq!(gone.error_json()["error"]["code"], "ISSUE_NOT_FOUND");
}

#[test]
fn list_paginates_and_filters() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");
    let project_id = create_project(&ws, "alice", "Core");
    for n in 0..21 {
        create_issue(&ws, "alice", project_id, &format!("Task {n:02}"));
    }
    let project = project_id.to_string();

    let first = run_bugdesk(&ws, ["issue", "list", &project, "--json"], "list_first");
    let page = first.json();
    assert_eq!(page["items"].as_array().unwrap().len(), 20);
    assert_eq!(page["has_next"], true);
    assert_eq!(page["total"], 21);

    let second = run_bugdesk(
        &ws,
        ["issue", "list", &project, "--page", "2", "--json"],
        "list_second",
    );
    let page = second.json();
    assert_eq!(page["items"][0]["title"], "Task 00");
    assert_eq!(page["has_next"], false);

    let search = run_bugdesk(
        &ws,
        ["issue", "list", &project, "--search", "task 1", "--json"],
        "list_search",
    );
    assert_eq!(search.json()["total"], 10);

    let nobody = run_bugdesk(
        &ws,
        ["issue", "list", &project, "--assignee", "someone", "--json"],
        "list_no_match",
    );
    assert!(nobody.status.success());
    assert_eq!(nobody.json()["items"].as_array().unwrap().len(), 0);
}

#[test]
fn validation_errors_are_structured() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");
    let project_id = create_project(&ws, "alice", "Core");
    let project = project_id.to_string();

    let run = run_bugdesk(
        &ws,
        ["issue", "create", &project, "Due", "--due", "31-12-2025", "--actor", "alice"],
        "bad_due",
    );
    assert_eq!(run.status.code(), Some(4));
    let err = run.error_json();
    assert_eq!(err["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(
        err["error"]["message"],
        "Invalid due date format. Use YYYY-MM-DD."
    );

    let duplicate = run_bugdesk(
        &ws,
        ["project", "create", "Core", "--actor", "alice"],
        "duplicate_project",
    );
    assert_eq!(duplicate.status.code(), Some(4));
    assert_eq!(duplicate.error_json()["error"]["code"], "CONFLICT");
}

#[test]
fn forbidden_edit_and_owner_only_delete() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");
    register(&ws, "mallory");
    let project_id = create_project(&ws, "alice", "Core");
    let issue = create_issue(&ws, "alice", project_id, "Secret").to_string();
    let project = project_id.to_string();

    let edit = run_bugdesk(
        &ws,
        ["issue", "edit", &issue, "--title", "Pwned", "--actor", "mallory"],
        "forbidden_edit",
    );
    assert_eq!(edit.status.code(), Some(5));
    assert_eq!(
        edit.error_json()["error"]["message"],
        "You are not authorized to edit this issue."
    );

    let delete = run_bugdesk(
        &ws,
        ["project", "delete", &project, "--actor", "alice"],
        "delete_with_issues",
    );
    assert_eq!(delete.status.code(), Some(5));
    assert_eq!(delete.error_json()["error"]["code"], "PROJECT_HAS_ISSUES");

    let cascade = run_bugdesk(
        &ws,
        ["project", "delete", &project, "--cascade", "--actor", "alice", "--json"],
        "delete_cascade",
    );
    assert!(cascade.status.success(), "cascade failed: {}", cascade.stderr);
    assert_eq!(cascade.json()["deleted_issues"], 1);
}

#[test]
fn members_by_username() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");
    register(&ws, "bob");
    let project = create_project(&ws, "alice", "Core").to_string();

    let add = run_bugdesk(
        &ws,
        ["project", "add-member", &project, "bob", "--role", "dev", "--actor", "alice"],
        "add_member",
    );
    assert!(add.status.success(), "add-member failed: {}", add.stderr);

    let members = run_bugdesk(&ws, ["project", "members", &project, "--json"], "members");
    let list = members.json();
    assert_eq!(list[0]["username"], "bob");
    assert_eq!(list[0]["role"], "dev");

    let typo = run_bugdesk(
        &ws,
        ["project", "add-member", &project, "bobb", "--actor", "alice"],
        "add_member_typo",
    );
    assert_eq!(typo.status.code(), Some(3));
    let err = typo.error_json();
    assert_eq!(err["error"]["code"], "USER_NOT_FOUND");
    assert!(
        predicate::str::contains("bob").eval(err["error"]["hint"].as_str().unwrap_or_default())
    );
}

#[test]
fn actor_comes_from_env_or_saved_login() {
    let ws = BugdeskWorkspace::initialized();
    register(&ws, "alice");

    let missing = run_bugdesk(&ws, ["project", "create", "NoActor"], "no_actor");
    assert_eq!(missing.status.code(), Some(4));

    let via_env = run_bugdesk_with_env(
        &ws,
        ["project", "create", "FromEnv"],
        [("BUGDESK_ACTOR", "alice")],
        "env_actor",
    );
    assert!(via_env.status.success(), "env actor failed: {}", via_env.stderr);

    let login = run_bugdesk(
        &ws,
        [
            "user",
            "login",
            "--email",
            "alice@example.com",
            "--password",
            "pw",
            "--save",
        ],
        "login_save",
    );
    assert!(login.status.success(), "login failed: {}", login.stderr);
    let config = fs::read_to_string(ws.root.join(".bugdesk/config.yaml")).unwrap();
    assert!(config.contains("actor: alice"));

    let saved = run_bugdesk(&ws, ["project", "create", "FromConfig"], "saved_actor");
    assert!(saved.status.success(), "saved actor failed: {}", saved.stderr);

    let bad_login = run_bugdesk(
        &ws,
        ["user", "login", "--email", "alice@example.com", "--password", "nope"],
        "bad_login",
    );
    assert_eq!(bad_login.status.code(), Some(4));
    assert_eq!(
        bad_login.error_json()["error"]["message"],
        "Invalid email or password."
    );
}

#[test]
fn completions_generate_for_bash() {
    let ws = BugdeskWorkspace::new();
    let run = run_bugdesk(&ws, ["completions", "bash"], "completions");
    assert!(run.status.success());
    assert!(predicate::str::contains("_bugdesk").eval(&run.stdout));
}
