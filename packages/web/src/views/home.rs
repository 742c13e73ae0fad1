//! Task dashboard at `/`.

use api::tasks::task_stats;
use api::Task;
use dioxus::prelude::*;
use ui::components::{Alert, Badge, BadgeVariant};
use ui::{
    use_auth, use_create_task_mutation, use_dashboard_tasks, use_i18n, use_sign_out_mutation,
    use_update_task_mutation, title_after_create, CreateTaskForm, Layout, LoadingSkeleton,
    ProtectedRoute, SidebarItem, TaskList,
};

use crate::Route;

#[component]
pub fn Home() -> Element {
    rsx! {
        ProtectedRoute {
            TaskDashboard {}
        }
    }
}

#[component]
fn TaskDashboard() -> Element {
    let i18n = use_i18n();
    let auth = use_auth();
    let nav = use_navigator();
    let tasks = use_dashboard_tasks();
    let create = use_create_task_mutation();
    let update = use_update_task_mutation();
    let sign_out = use_sign_out_mutation();
    let mut new_title = use_signal(String::new);

    let sidebar_items = vec![
        SidebarItem::new(i18n.t("common.dashboard"), "/"),
        SidebarItem::new(i18n.t("common.profile"), "/dashboard/profile"),
        SidebarItem::new(i18n.t("common.settings"), "/dashboard/settings"),
    ];

    let state = auth();
    let user_email = state.user.as_ref().and_then(|u| u.email.clone());

    let (list, loading, load_error): (Vec<Task>, bool, Option<String>) = match &*tasks.read() {
        None => (Vec::new(), true, None),
        Some(Ok(list)) => (list.clone(), false, None),
        Some(Err(e)) => {
            let message = e.user_message(&i18n.t("dashboard.loadingTasks"));
            (Vec::new(), false, Some(message))
        }
    };
    let stats = task_stats(&list);
    let mutation_error = create.state.error().or(update.state.error());
    let load_error_title = format!(
        "{}: {}",
        i18n.t("common.error"),
        i18n.t("dashboard.loadingTasks")
    );

    rsx! {
        Layout {
            user_email: user_email,
            sidebar_items: sidebar_items,
            on_sign_out: move |_| async move {
                sign_out.mutate().await;
                nav.push(Route::SignIn {});
            },

            if state.loading {
                LoadingSkeleton {}
            } else {
                div { class: "page-heading",
                    div { class: "row",
                        h1 { {i18n.t("dashboard.title")} }
                        if stats.total > 0 {
                            Badge { variant: BadgeVariant::Warning,
                                "{stats.pending} "
                                {i18n.t("dashboard.pending")}
                            }
                        }
                    }
                    p { class: "muted", {i18n.t("dashboard.subtitle")} }
                }

                div { class: "stack-lg",
                    if let Some(details) = load_error {
                        Alert {
                            title: load_error_title.clone(),
                            message: details,
                        }
                    }
                    if let Some(message) = mutation_error {
                        Alert {
                            message: message,
                            dismiss_label: i18n.t("common.dismiss"),
                            on_dismiss: move |_| {
                                let (mut created, mut updated) = (create.state, update.state);
                                created.clear_error();
                                updated.clear_error();
                            },
                        }
                    }

                    section { class: "card",
                        h2 { {i18n.t("dashboard.myTasks")} }
                        div { class: "stack",
                            CreateTaskForm {
                                title: new_title,
                                loading: create.state.is_loading(),
                                on_submit: move |submitted: String| async move {
                                    let created = create.mutate(submitted.clone()).await;
                                    let current = new_title.peek().clone();
                                    let next =
                                        title_after_create(&current, &submitted, created.is_some());
                                    new_title.set(next);
                                },
                            }
                            TaskList {
                                tasks: list,
                                loading: loading,
                                disabled: update.state.is_loading(),
                                on_toggle: move |task: Task| async move {
                                    update.toggle(task).await;
                                },
                            }
                        }
                    }

                    section { class: "card",
                        h2 { {i18n.t("dashboard.quickStats")} }
                        dl { class: "stats",
                            div { class: "stat",
                                dt { {i18n.t("dashboard.totalTasks")} }
                                dd { class: "stat-value", "{stats.total}" }
                            }
                            div { class: "stat",
                                dt { {i18n.t("dashboard.completed")} }
                                dd { Badge { variant: BadgeVariant::Success, "{stats.completed}" } }
                            }
                            div { class: "stat",
                                dt { {i18n.t("dashboard.pending")} }
                                dd { Badge { variant: BadgeVariant::Warning, "{stats.pending}" } }
                            }
                        }
                    }
                }
            }
        }
    }
}
