use std::str::FromStr;

use time::OffsetDateTime;

use crate::tasks::repo_types::Task;

/// Tabs of the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

fn is_overdue(task: &Task, now: OffsetDateTime) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < now)
}

impl TaskFilter {
    pub fn matches(self, task: &Task, now: OffsetDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => is_overdue(task, now),
        }
    }

    pub fn apply(self, tasks: &[Task], now: OffsetDateTime) -> Vec<&Task> {
        tasks.iter().filter(|t| self.matches(t, now)).collect()
    }
}

impl FromStr for TaskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "pending" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            other => anyhow::bail!("unknown task filter {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: OffsetDateTime) -> Self {
        tasks.iter().fold(Self::default(), |mut s, t| {
            s.total += 1;
            if t.completed {
                s.completed += 1;
            } else {
                s.active += 1;
            }
            if is_overdue(t, now) {
                s.overdue += 1;
            }
            s
        })
    }
}
