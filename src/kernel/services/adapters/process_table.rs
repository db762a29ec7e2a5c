//! 进程表快照
//!
//! 搜索命令是 `sh -c "find ... | xargs grep ..."`，直接 spawn 出来的只是 shell，
//! 真正干活的 find/xargs/grep 是它的后代。取消时需要整棵进程树的 pid。

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use sysinfo::{ProcessesToUpdate, Signal, System};

pub type Pid = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessNode {
    pub pid: Pid,
    pub name: String,
    pub parent: Pid,
}

#[derive(Default)]
pub struct ProcessTable {
    nodes: FxHashMap<Pid, ProcessNode>,
    children: FxHashMap<Pid, Vec<Pid>>,
    /// 仅 `snapshot()` 得到的表可以发信号
    system: Option<System>,
}

impl ProcessTable {
    pub fn snapshot() -> Self {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let nodes: Vec<ProcessNode> = system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                // 进程在枚举过程中退出时没有父进程信息，直接跳过
                let parent = process.parent()?;
                Some(ProcessNode {
                    pid: pid.as_u32(),
                    name: process.name().to_string_lossy().into_owned(),
                    parent: parent.as_u32(),
                })
            })
            .collect();
        tracing::trace!(count = nodes.len(), "process table snapshot");

        let mut table = Self::from_nodes(nodes);
        table.system = Some(system);
        table
    }

    pub fn from_nodes<I: IntoIterator<Item = ProcessNode>>(nodes: I) -> Self {
        let mut table = Self::default();
        for node in nodes {
            table.children.entry(node.parent).or_default().push(node.pid);
            table.nodes.insert(node.pid, node);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, pid: Pid) -> Option<&ProcessNode> {
        self.nodes.get(&pid)
    }

    pub fn name(&self, pid: Pid) -> Option<&str> {
        self.nodes.get(&pid).map(|n| n.name.as_str())
    }

    /// 所有可传递到达的子进程，不含 `pid` 本身。
    ///
    /// 已访问过的 pid 不再展开，表中存在环时也会终止。
    pub fn all_descendants(&self, pid: Pid) -> FxHashSet<Pid> {
        let mut visited = FxHashSet::default();
        visited.insert(pid);

        let mut out = FxHashSet::default();
        let mut queue = VecDeque::from([pid]);
        while let Some(current) = queue.pop_front() {
            let Some(kids) = self.children.get(&current) else {
                continue;
            };
            for &kid in kids {
                if visited.insert(kid) {
                    out.insert(kid);
                    queue.push_back(kid);
                }
            }
        }
        out
    }

    /// 向快照中的 `pid` 发送 SIGTERM；进程已不存在或平台不支持时返回 false。
    pub fn terminate(&self, pid: Pid) -> bool {
        let name = self.name(pid).unwrap_or("?");
        let process = self
            .system
            .as_ref()
            .and_then(|system| system.process(sysinfo::Pid::from_u32(pid)));
        let Some(process) = process else {
            tracing::debug!(pid, name, "process gone before SIGTERM");
            return false;
        };

        match process.kill_with(Signal::Term) {
            Some(true) => {
                tracing::info!(pid, name, "sent SIGTERM");
                true
            }
            Some(false) => {
                tracing::debug!(pid, name, "SIGTERM not delivered");
                false
            }
            None => {
                tracing::warn!(pid, name, "SIGTERM unsupported on this platform");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/process_table.rs"]
mod tests;
