use hindsight_model::{Event, EventDefinition, EventSource, Flag, Project, Session, Task};
use std::collections::HashMap;

pub const T0: i64 = 1_700_000_000;

pub fn project_with_vocabulary() -> Project {
    let mut project = Project::new("proj_1");
    for (name, description) in [
        ("bug", "the assistant produced incorrect output"),
        ("positive", "user expressed satisfaction"),
    ] {
        project.define_event(EventDefinition {
            name: name.to_string(),
            description: description.to_string(),
        });
    }
    project
}

pub fn task(id: &str, created_at: i64, flag: Flag, event_names: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        project_id: "proj_1".to_string(),
        session_id: None,
        created_at,
        input: format!("input for {id}"),
        output: Some(format!("output for {id}")),
        flag,
        metadata: HashMap::new(),
        events: event_names
            .iter()
            .map(|name| Event {
                id: format!("evt_{id}_{name}"),
                task_id: id.to_string(),
                session_id: None,
                project_id: "proj_1".to_string(),
                event_name: name.to_string(),
                source: EventSource::Detector("checker".to_string()),
                created_at,
            })
            .collect(),
    }
}

pub fn in_session(mut task: Task, session_id: &str) -> Task {
    task.session_id = Some(session_id.to_string());
    task
}

pub fn session(id: &str, tasks: Vec<Task>) -> Session {
    Session {
        id: id.to_string(),
        project_id: "proj_1".to_string(),
        tasks,
    }
}
