//! Candidate discovery: directory enumeration and single-file mode.

use walkdir::WalkDir;

use crate::job::JobConfig;
use crate::plan::{OrderedTaskList, PlanBuilder};

/// Build the ordered work list for a job.
///
/// In directory mode the current directory is listed non-recursively and
/// every regular file is offered to the planner; in single-file mode exactly
/// the named file is planned.  Unplannable candidates are logged and skipped.
pub fn collect_tasks(builder: &PlanBuilder<'_>, job: &JobConfig) -> OrderedTaskList {
    let mut list = OrderedTaskList::new();

    if let Some(single) = &job.single_file {
        let name = single.to_string_lossy();
        match builder.plan(&name) {
            Ok(task) => list.insert(task),
            Err(reason) => tracing::warn!(file = %name, %reason, "skipping"),
        }
        return list;
    }

    for entry in WalkDir::new(".")
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        match builder.plan(&name) {
            Ok(task) => {
                tracing::debug!(file = %name, "queued");
                list.insert(task);
            }
            Err(reason) => tracing::debug!(file = %name, %reason, "skipping"),
        }
    }

    list
}
