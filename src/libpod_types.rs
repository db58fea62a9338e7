//! Typed views of pod payloads.
//!
//! Operations return raw JSON; these structs decode the parts callers usually
//! need. Unknown fields are ignored.
//!
//! ```ignore
//! let inspect: PodInspect = serde_json::from_value(pod.inspect(None).await?.into_payload().unwrap_or_default())?;
//! let mut stats = pod.stats(None).await?.into_stream().map(PodStream::decode_lines::<Vec<PodStatsReport>>);
//! ```

use serde::Deserialize;

/// Payload of `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodInspect {
    /// Pod ID.
    pub id: String,
    /// Pod name.
    pub name: String,
    /// Pod state, e.g. "Running".
    #[serde(default)]
    pub state: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: Option<String>,
    /// ID of the infra container.
    #[serde(rename = "InfraContainerID", default)]
    pub infra_container_id: Option<String>,
    /// Number of containers in the pod.
    #[serde(default)]
    pub num_containers: Option<u32>,
    /// Containers in the pod.
    #[serde(default)]
    pub containers: Vec<PodContainer>,
}

/// Container entry of a [`PodInspect`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodContainer {
    /// Container ID.
    pub id: String,
    /// Container name.
    #[serde(default)]
    pub name: Option<String>,
    /// Container state.
    #[serde(default)]
    pub state: Option<String>,
}

/// Payload of `top`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodTop {
    /// Column titles.
    #[serde(default)]
    pub titles: Vec<String>,
    /// One row per process, aligned with `titles`.
    #[serde(default)]
    pub processes: Vec<Vec<String>>,
}

/// One container's entry in a `stats` event. Each event is an array of these.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PodStatsReport {
    /// Pod ID.
    #[serde(rename = "Pod")]
    pub pod: String,
    /// Container ID.
    #[serde(rename = "CID")]
    pub container_id: String,
    /// Container name.
    #[serde(rename = "Name")]
    pub name: String,
    /// CPU usage, e.g. "0.52%".
    #[serde(rename = "CPU", default)]
    pub cpu: String,
    /// Memory usage, e.g. "1.2MB / 8GB".
    #[serde(rename = "MemUsage", default)]
    pub mem_usage: String,
    /// Memory usage percentage.
    #[serde(rename = "Mem", default)]
    pub mem: String,
    /// Network I/O.
    #[serde(rename = "NetIO", default)]
    pub net_io: String,
    /// Block I/O.
    #[serde(rename = "BlockIO", default)]
    pub block_io: String,
    /// Process count.
    #[serde(rename = "PIDS", default)]
    pub pids: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_inspect() {
        let value = json!({
            "Id": "c0ffee",
            "Name": "web",
            "State": "Running",
            "InfraContainerID": "infra1",
            "NumContainers": 2,
            "Containers": [
                {"Id": "infra1", "Name": "c0ffee-infra", "State": "running"},
                {"Id": "app1", "Name": "app", "State": "running"}
            ],
            "Labels": {}
        });
        let inspect: PodInspect = serde_json::from_value(value).unwrap();
        assert_eq!(inspect.name, "web");
        assert_eq!(inspect.infra_container_id.as_deref(), Some("infra1"));
        assert_eq!(inspect.num_containers, Some(2));
        assert_eq!(inspect.containers.len(), 2);
        assert_eq!(inspect.created, None);
    }

    #[test]
    fn test_decode_top() {
        let top: PodTop = serde_json::from_value(json!({
            "Titles": ["USER", "PID", "COMMAND"],
            "Processes": [["root", "1", "nginx"]]
        }))
        .unwrap();
        assert_eq!(top.titles.len(), 3);
        assert_eq!(top.processes[0][2], "nginx");
    }

    #[test]
    fn test_decode_stats_event() {
        let reports: Vec<PodStatsReport> = serde_json::from_value(json!([
            {"Pod": "c0ffee", "CID": "app1", "Name": "app", "CPU": "0.52%", "MemUsage": "1MB / 8GB",
             "Mem": "0.01%", "NetIO": "1kB / 2kB", "BlockIO": "0B / 0B", "PIDS": "3"}
        ]))
        .unwrap();
        assert_eq!(reports[0].cpu, "0.52%");
        assert_eq!(reports[0].pids, "3");
    }
}
