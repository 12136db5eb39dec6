//! Device directory — static resolution of catalog identifiers.
//!
//! The directory is built once from the catalog documents and answers two
//! questions: which vendor address does a device uid map to, and which
//! device uids does a group contain. Unknown uids are dropped silently at
//! resolution time; a stale reference in a catalog is configuration drift,
//! not a failure.

use std::collections::{HashMap, HashSet};

use crate::device::{Device, DeviceGroup};
use crate::id::{DeviceUid, DeviceUrl, GroupUid};

/// Read-only lookup over the device and device-group catalogs.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    devices: Vec<Device>,
    groups: Vec<DeviceGroup>,
    devices_by_uid: HashMap<DeviceUid, usize>,
    groups_by_uid: HashMap<GroupUid, usize>,
}

impl DeviceDirectory {
    /// Build a directory from the loaded catalogs.
    #[must_use]
    pub fn new(devices: Vec<Device>, groups: Vec<DeviceGroup>) -> Self {
        let devices_by_uid = devices
            .iter()
            .enumerate()
            .map(|(idx, device)| (device.uid.clone(), idx))
            .collect();
        let groups_by_uid = groups
            .iter()
            .enumerate()
            .map(|(idx, group)| (group.uid.clone(), idx))
            .collect();
        Self {
            devices,
            groups,
            devices_by_uid,
            groups_by_uid,
        }
    }

    /// Look up a device by uid.
    #[must_use]
    pub fn device(&self, uid: &DeviceUid) -> Option<&Device> {
        self.devices_by_uid.get(uid).map(|idx| &self.devices[*idx])
    }

    /// Look up a group by uid.
    #[must_use]
    pub fn group(&self, uid: &GroupUid) -> Option<&DeviceGroup> {
        self.groups_by_uid.get(uid).map(|idx| &self.groups[*idx])
    }

    /// All devices, in catalog order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// All groups, in catalog order.
    #[must_use]
    pub fn groups(&self) -> &[DeviceGroup] {
        &self.groups
    }

    /// Map device uids to vendor addresses.
    ///
    /// Unknown uids are dropped; the result is deduplicated preserving
    /// first-seen order (a device reachable twice is addressed once).
    #[must_use]
    pub fn resolve_device_urls(&self, uids: &[DeviceUid]) -> Vec<DeviceUrl> {
        let mut seen = HashSet::new();
        uids.iter()
            .filter_map(|uid| self.device(uid))
            .map(|device| device.device_url.clone())
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Flatten group membership into device uids.
    ///
    /// Unknown group uids are dropped. The result is **not** deduplicated;
    /// deduplication happens after the final address mapping.
    #[must_use]
    pub fn resolve_groups_to_device_uids(&self, group_uids: &[GroupUid]) -> Vec<DeviceUid> {
        group_uids
            .iter()
            .filter_map(|uid| self.group(uid))
            .flat_map(|group| group.devices.iter().cloned())
            .collect()
    }

    /// Resolve groups all the way down to deduplicated vendor addresses.
    #[must_use]
    pub fn resolve_groups_to_urls(&self, group_uids: &[GroupUid]) -> Vec<DeviceUrl> {
        self.resolve_device_urls(&self.resolve_groups_to_device_uids(group_uids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> DeviceDirectory {
        let devices = vec![
            Device::builder()
                .uid("d1")
                .name("Bedroom left")
                .device_url("io://1234/AAA")
                .build()
                .unwrap(),
            Device::builder()
                .uid("d2")
                .name("Bedroom right")
                .device_url("io://1234/BBB")
                .build()
                .unwrap(),
            // Two uids pointing at the same physical shutter.
            Device::builder()
                .uid("d2-alias")
                .name("Bedroom right (alias)")
                .device_url("io://1234/BBB")
                .build()
                .unwrap(),
        ];
        let groups = vec![
            DeviceGroup::builder()
                .uid("g1")
                .name("Bedroom")
                .device("d1")
                .device("d2")
                .build()
                .unwrap(),
            DeviceGroup::builder()
                .uid("g2")
                .name("Right side")
                .device("d2")
                .device("d2-alias")
                .device("missing")
                .build()
                .unwrap(),
        ];
        DeviceDirectory::new(devices, groups)
    }

    #[test]
    fn should_resolve_uids_preserving_first_seen_order() {
        let dir = directory();
        let urls = dir.resolve_device_urls(&[DeviceUid::from("d2"), DeviceUid::from("d1")]);
        assert_eq!(
            urls,
            vec![DeviceUrl::from("io://1234/BBB"), DeviceUrl::from("io://1234/AAA")]
        );
    }

    #[test]
    fn should_drop_unknown_device_uids_silently() {
        let dir = directory();
        let urls = dir.resolve_device_urls(&[DeviceUid::from("nope"), DeviceUid::from("d1")]);
        assert_eq!(urls, vec![DeviceUrl::from("io://1234/AAA")]);
    }

    #[test]
    fn should_deduplicate_addresses_reachable_via_multiple_uids() {
        let dir = directory();
        let urls = dir.resolve_device_urls(&[
            DeviceUid::from("d2"),
            DeviceUid::from("d2-alias"),
            DeviceUid::from("d2"),
        ]);
        assert_eq!(urls, vec![DeviceUrl::from("io://1234/BBB")]);
    }

    #[test]
    fn should_flatten_groups_without_deduplicating_uids() {
        let dir = directory();
        let uids =
            dir.resolve_groups_to_device_uids(&[GroupUid::from("g1"), GroupUid::from("g2")]);
        assert_eq!(
            uids,
            vec![
                DeviceUid::from("d1"),
                DeviceUid::from("d2"),
                DeviceUid::from("d2"),
                DeviceUid::from("d2-alias"),
                DeviceUid::from("missing"),
            ]
        );
    }

    #[test]
    fn should_drop_unknown_group_uids_silently() {
        let dir = directory();
        let uids = dir.resolve_groups_to_device_uids(&[GroupUid::from("ghost")]);
        assert!(uids.is_empty());
    }

    #[test]
    fn should_resolve_groups_to_deduplicated_union_of_addresses() {
        let dir = directory();
        let urls = dir.resolve_groups_to_urls(&[GroupUid::from("g1"), GroupUid::from("g2")]);
        assert_eq!(
            urls,
            vec![DeviceUrl::from("io://1234/AAA"), DeviceUrl::from("io://1234/BBB")]
        );
    }

    #[test]
    fn should_resolve_empty_group_list_to_empty_addresses() {
        let dir = directory();
        assert!(dir.resolve_groups_to_urls(&[]).is_empty());
    }
}
