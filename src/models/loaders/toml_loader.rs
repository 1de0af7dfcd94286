use crate::error::TaskSetError;
use crate::models::task::TaskSet;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// 从 TOML 文件加载任务集
///
/// 文件格式：
/// ```toml
/// [[tasks]]
/// name = "ProjectDescription"
/// question = "Create a description of the project..."
/// ```
pub async fn load_task_set(toml_file_path: &Path) -> Result<TaskSet, TaskSetError> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| TaskSetError::ReadFailed {
            path: toml_file_path.display().to_string(),
            source,
        })?;

    let tasks = parse_task_set(&content).map_err(|e| match e {
        TaskSetError::TomlParseFailed { source, .. } => TaskSetError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source,
        },
        other => other,
    })?;

    info!(
        "✓ 从 {} 加载了 {} 个任务",
        toml_file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        tasks.len()
    );

    Ok(tasks)
}

/// 解析并校验任务集
pub fn parse_task_set(content: &str) -> Result<TaskSet, TaskSetError> {
    let mut tasks: TaskSet =
        toml::from_str(content).map_err(|source| TaskSetError::TomlParseFailed {
            path: String::new(),
            source,
        })?;

    if tasks.is_empty() {
        return Err(TaskSetError::Empty);
    }

    for (index, task) in tasks.tasks.iter_mut().enumerate() {
        task.name = task.name.trim().to_string();
        if task.name.is_empty() {
            return Err(TaskSetError::EmptyName { index: index + 1 });
        }
        if task.question.trim().is_empty() {
            return Err(TaskSetError::EmptyQuestion {
                name: task.name.clone(),
            });
        }
    }

    for name in tasks.duplicate_names() {
        warn!("⚠️ 任务名称 {} 重复定义，结果以最后一个定义为准", name);
    }

    Ok(tasks)
}
