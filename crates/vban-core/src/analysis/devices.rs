use std::collections::BTreeMap;
use std::net::SocketAddr;

use crate::DeviceSummary;
use crate::protocols::vban::service::PingPacket;

/// Identification packets keyed by source endpoint; the latest one wins.
#[derive(Debug, Default)]
pub(crate) struct DeviceTable {
    devices: BTreeMap<SocketAddr, DeviceSummary>,
}

impl DeviceTable {
    pub fn add_ping(&mut self, ping: &PingPacket, source: SocketAddr) {
        let data = &ping.data;
        let previous = self.devices.get(&source);
        let pings = previous.map_or(0, |device| device.pings) + 1;
        let replied = previous.is_some_and(|device| device.replied) || ping.header.is_reply;
        let summary = DeviceSummary {
            source: source.to_string(),
            application_type: data.application_type.name().to_string(),
            application_name: data.application_name.clone(),
            device_name: data.device_name.clone(),
            manufacturer_name: data.manufacturer_name.clone(),
            hostname: data.hostname.clone(),
            user_name: data.user_name.clone(),
            features: data
                .features
                .iter_names()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect(),
            pings,
            replied,
        };
        self.devices.insert(source, summary);
    }

    pub fn into_summaries(self) -> Vec<DeviceSummary> {
        self.devices.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceTable;
    use crate::protocols::vban::service::{PingData, PingPacket, ServiceHeader};

    #[test]
    fn latest_identity_wins() {
        let source = "192.168.1.20:6980".parse().unwrap();
        let mut table = DeviceTable::default();
        let mut ping = PingPacket {
            header: ServiceHeader::new("VBAN Service", 1),
            data: PingData {
                device_name: "old".to_string(),
                ..PingData::default()
            },
        };
        table.add_ping(&ping, source);
        ping.data.device_name = "Windows PC".to_string();
        ping.header.is_reply = true;
        table.add_ping(&ping, source);

        let devices = table.into_summaries();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_name, "Windows PC");
        assert_eq!(devices[0].application_type, "server");
        assert_eq!(devices[0].pings, 2);
        assert!(devices[0].replied);
        assert!(devices[0].features.contains(&"midi".to_string()));
        assert!(devices[0].features.contains(&"audio".to_string()));
    }
}
