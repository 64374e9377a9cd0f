//! Built-in task list used when no catalog file is configured.

use crate::domain::models::Task;

pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task::new("complete-profile", "Profil vervollständigen", 20)
            .with_description("Fill in your public member profile")
            .with_category("onboarding"),
        Task::new("introduce-yourself", "Stell dich vor", 20)
            .with_description("Post a short introduction in the community channel")
            .with_category("onboarding"),
        Task::new("attend-meetup", "Treffen besuchen", 30)
            .with_description("Attend a local community meetup")
            .with_category("community")
            .repeatable(),
        Task::new("neighbourhood-cleanup", "Nachbarschaftsputz", 40)
            .with_description("Join a neighbourhood cleanup")
            .with_category("community")
            .repeatable(),
        Task::new("policy-feedback", "Feedback zu einem Antrag", 50)
            .with_description("Give written feedback on an open proposal")
            .with_category("participation")
            .requiring_comment(),
        Task::new("recruit-member", "Mitglied werben", 60)
            .with_description("Bring a new member to the platform")
            .with_category("participation"),
        Task::new("special-recognition", "Besondere Anerkennung", 100)
            .with_description("Awarded by moderators for outstanding contributions")
            .with_category("special")
            .restricted(),
    ]
}
