//! Task list widgets.

use api::Task;
use dioxus::prelude::*;

use crate::components::{Button, ButtonVariant, Input, Spinner};
use crate::i18n::use_i18n;

/// Single-line form for a new task. Blank titles are ignored.
///
/// The caller owns `title` and decides when to clear it, normally with
/// [`title_after_create`] once the create has finished.
#[component]
pub fn CreateTaskForm(
    title: Signal<String>,
    on_submit: EventHandler<String>,
    #[props(default)] loading: bool,
) -> Element {
    let i18n = use_i18n();
    let mut title = title;

    let blank = title().trim().is_empty();

    rsx! {
        form {
            class: "card create-task-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let trimmed = title().trim().to_string();
                if trimmed.is_empty() || loading {
                    return;
                }
                on_submit.call(trimmed);
            },
            Input {
                id: "new-task-title",
                class: "grow",
                placeholder: i18n.t("tasks.taskTitle"),
                value: title(),
                disabled: loading,
                oninput: move |evt: FormEvent| title.set(evt.value()),
            }
            Button {
                variant: ButtonVariant::Primary,
                r#type: "submit",
                disabled: loading || blank,
                if loading {
                    Spinner { small: true }
                } else {
                    {i18n.t("tasks.addTask")}
                }
            }
        }
    }
}

/// What the new-task input should hold after a create for `submitted`.
///
/// A failed create keeps the text. A successful one clears it unless the
/// user has typed something else in the meantime.
pub fn title_after_create(current: &str, submitted: &str, created: bool) -> String {
    if created && current.trim() == submitted {
        String::new()
    } else {
        current.to_string()
    }
}

#[component]
pub fn TaskItem(
    task: Task,
    on_toggle: EventHandler<Task>,
    #[props(default)] disabled: bool,
) -> Element {
    let i18n = use_i18n();
    let checkbox_id = format!("task-{}", task.id);
    let date = i18n.date(task.created_at);
    let created = i18n.t_with("tasks.createdOn", &[("date", date.as_str())]);
    let toggled = task.clone();

    rsx! {
        div { class: if task.completed { "card task-item completed" } else { "card task-item" },
            input {
                id: "{checkbox_id}",
                class: "task-checkbox",
                r#type: "checkbox",
                checked: task.completed,
                disabled: disabled,
                onchange: move |_| on_toggle.call(toggled.clone()),
            }
            label { class: "task-body", r#for: "{checkbox_id}",
                span { class: "task-title", "{task.title}" }
                span { class: "task-date", "{created}" }
            }
        }
    }
}

/// Skeleton rows while loading, an empty-state panel for no tasks,
/// otherwise one [`TaskItem`] per task.
#[component]
pub fn TaskList(
    tasks: Vec<Task>,
    on_toggle: EventHandler<Task>,
    #[props(default)] loading: bool,
    #[props(default)] disabled: bool,
) -> Element {
    let i18n = use_i18n();

    if loading {
        return rsx! {
            div { class: "task-list",
                for index in 0..3 {
                    div { key: "{index}", class: "card task-item",
                        div { class: "skeleton skeleton-line" }
                        div { class: "skeleton skeleton-text short" }
                    }
                }
            }
        };
    }

    if tasks.is_empty() {
        return rsx! {
            div { class: "task-list-empty", {i18n.t("dashboard.noTasks")} }
        };
    }

    rsx! {
        div { class: "task-list",
            for task in tasks {
                TaskItem {
                    key: "{task.id}",
                    task: task.clone(),
                    on_toggle: on_toggle,
                    disabled: disabled,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_create_keeps_title() {
        assert_eq!(title_after_create("Buy milk", "Buy milk", false), "Buy milk");
    }

    #[test]
    fn test_successful_create_clears_title() {
        assert_eq!(title_after_create("Buy milk", "Buy milk", true), "");
        assert_eq!(title_after_create("  Buy milk ", "Buy milk", true), "");
    }

    #[test]
    fn test_edits_made_while_pending_survive() {
        assert_eq!(title_after_create("Buy bread", "Buy milk", true), "Buy bread");
    }
}
