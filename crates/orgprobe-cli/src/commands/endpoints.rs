use orgprobe_core::{adapter_for, EndpointId};

use super::EndpointInfo;

pub fn run() -> Vec<EndpointInfo> {
    EndpointId::ALL
        .into_iter()
        .map(|id| EndpointInfo {
            id,
            requires_session: adapter_for(id).requires_session(),
        })
        .collect()
}
