use std::collections::{HashMap, HashSet};

use crate::address::{normalize_address, parse};
use crate::contact::{ContactRecord, Coordinate};
use crate::marker::{ContactList, Marker};

/// How base addresses are compared when building groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupingPolicy {
    /// Byte-for-byte match of the trimmed base address.
    #[default]
    Exact,
    /// Case-insensitive match with whitespace runs collapsed.
    FoldCase,
}

impl GroupingPolicy {
    pub fn key(&self, base: &str) -> String {
        match self {
            GroupingPolicy::Exact => base.to_string(),
            GroupingPolicy::FoldCase => normalize_address(base),
        }
    }
}

/// Contacts sharing one base address, bucketed by unit (`None` is "no unit").
#[derive(Debug)]
pub struct AddressGroup<'a> {
    pub base: String,
    pub coordinate: Option<Coordinate>,
    pub units: HashMap<Option<String>, Vec<&'a ContactRecord>>,
}

impl<'a> AddressGroup<'a> {
    fn new(base: String) -> Self {
        Self {
            base,
            coordinate: None,
            units: HashMap::new(),
        }
    }

    fn insert(&mut self, unit: Option<String>, contact: &'a ContactRecord) {
        if self.coordinate.is_none() {
            self.coordinate = contact.coordinate();
        }
        self.units.entry(unit).or_default().push(contact);
    }

    pub fn contacts(&self) -> impl Iterator<Item = &'a ContactRecord> + '_ {
        self.units.values().flat_map(|bucket| bucket.iter().copied())
    }

    pub fn contact_count(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }

    /// Doors at the address. The "no unit" bucket only counts as a door
    /// once at least one named unit shares the building.
    pub fn unit_count(&self) -> usize {
        let named = self.units.keys().filter(|unit| unit.is_some()).count();
        if named == 0 {
            0
        } else {
            self.units.len()
        }
    }

    /// `None` when no contact in the group has been geocoded.
    pub fn to_marker(&self) -> Option<Marker> {
        let coordinate = self.coordinate?;

        let contact_count = self.contact_count();
        let unit_count = self.unit_count();
        let is_multi_unit = unit_count > 1;
        let has_customer = self.contacts().any(ContactRecord::is_customer);
        let has_unqualified = self.contacts().any(ContactRecord::is_unqualified);
        let total_knocks = self
            .contacts()
            .fold(0u32, |acc, contact| acc.saturating_add(contact.knock_count()));

        Some(Marker {
            address: self.base.clone(),
            coordinate,
            total_knocks,
            unit_count,
            contact_count,
            list: if has_customer {
                ContactList::Customers
            } else {
                ContactList::Prospects
            },
            is_unqualified: !has_customer && has_unqualified,
            is_multi_unit,
            shows_multi_contact: !is_multi_unit && contact_count > 1,
        })
    }
}

/// Groups contacts by base address, in first-seen order.
pub fn group_contacts(contacts: &[ContactRecord], policy: GroupingPolicy) -> Vec<AddressGroup<'_>> {
    let mut groups: Vec<AddressGroup<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for contact in contacts {
        let parts = parse(contact.address());
        let key = policy.key(&parts.base);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(AddressGroup::new(parts.base.clone()));
            groups.len() - 1
        });
        groups[slot].insert(parts.unit, contact);
    }

    groups
}

/// Builds one marker per geocoded address.
///
/// Groups without any resolved coordinate are dropped silently. Markers
/// come out in first-seen order, but callers that care about order should
/// sort explicitly.
pub fn aggregate(contacts: &[ContactRecord]) -> Vec<Marker> {
    aggregate_with(contacts, GroupingPolicy::default())
}

pub fn aggregate_with(contacts: &[ContactRecord], policy: GroupingPolicy) -> Vec<Marker> {
    group_contacts(contacts, policy)
        .iter()
        .filter_map(AddressGroup::to_marker)
        .collect()
}

/// Contacts that cannot be placed on the map: no contact at their base
/// address has a coordinate.
pub fn unplaced_contacts(contacts: &[ContactRecord], policy: GroupingPolicy) -> Vec<&ContactRecord> {
    let placed: HashSet<String> = contacts
        .iter()
        .filter(|contact| contact.coordinate().is_some())
        .map(|contact| policy.key(&parse(contact.address()).base))
        .collect();

    contacts
        .iter()
        .filter(|contact| !placed.contains(&policy.key(&parse(contact.address()).base)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Customer, Prospect};
    use proptest::prelude::*;

    fn prospect(address: &str, coordinate: Option<(f64, f64)>, knocks: u32, unqualified: bool) -> ContactRecord {
        ContactRecord::Prospect(Prospect {
            id: 0,
            full_name: "Prospect".to_string(),
            address: address.to_string(),
            coordinate: coordinate.map(|(lat, lon)| Coordinate::new(lat, lon)),
            knock_count: knocks,
            is_unqualified: unqualified,
        })
    }

    fn customer(address: &str, coordinate: Option<(f64, f64)>, knocks: u32) -> ContactRecord {
        ContactRecord::Customer(Customer {
            id: 0,
            full_name: "Customer".to_string(),
            address: address.to_string(),
            coordinate: coordinate.map(|(lat, lon)| Coordinate::new(lat, lon)),
            knock_count: knocks,
        })
    }

    #[test]
    fn empty_input_yields_no_markers() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn building_with_front_door_and_unit() {
        let contacts = vec![
            prospect("1 Elm St", Some((0.0, 0.0)), 1, false),
            customer("1 Elm St Unit 2", Some((0.0, 0.0)), 3),
        ];

        let markers = aggregate(&contacts);
        assert_eq!(markers.len(), 1);

        let marker = &markers[0];
        assert_eq!(marker.address, "1 Elm St");
        assert_eq!(marker.unit_count, 2);
        assert!(marker.is_multi_unit);
        assert!(!marker.shows_multi_contact);
        assert_eq!(marker.list, ContactList::Customers);
        assert_eq!(marker.total_knocks, 4);
        assert_eq!(marker.contact_count, 2);
        assert!(!marker.is_unqualified);
    }

    #[test]
    fn residents_sharing_one_door() {
        let contacts = vec![
            prospect("8 Maple Dr", Some((1.0, 2.0)), 0, true),
            prospect("8 Maple Dr", Some((1.0, 2.0)), 2, false),
        ];

        let markers = aggregate(&contacts);
        assert_eq!(markers.len(), 1);

        let marker = &markers[0];
        assert_eq!(marker.unit_count, 0);
        assert!(!marker.is_multi_unit);
        assert!(marker.shows_multi_contact);
        assert_eq!(marker.list, ContactList::Prospects);
        assert!(marker.is_unqualified);
        assert_eq!(marker.total_knocks, 2);
    }

    #[test]
    fn single_named_unit_is_not_multi_unit() {
        let contacts = vec![
            prospect("3 Ash Way unit 5", Some((0.0, 0.0)), 1, false),
            prospect("3 Ash Way Unit 5", None, 1, false),
        ];

        let marker = &aggregate(&contacts)[0];
        assert_eq!(marker.unit_count, 1);
        assert!(!marker.is_multi_unit);
        assert!(marker.shows_multi_contact);
    }

    #[test]
    fn customer_hides_unqualified_prospects() {
        let contacts = vec![
            prospect("4 Fir St", Some((0.0, 0.0)), 0, true),
            prospect("4 Fir St", Some((0.0, 0.0)), 0, true),
            customer("4 Fir St", Some((0.0, 0.0)), 0),
        ];

        let marker = &aggregate(&contacts)[0];
        assert_eq!(marker.list, ContactList::Customers);
        assert!(!marker.is_unqualified);
    }

    #[test]
    fn group_without_coordinates_is_dropped() {
        let contacts = vec![
            prospect("10 Lone Rd", None, 4, false),
            prospect("11 Placed Rd", Some((5.0, 6.0)), 1, false),
        ];

        let markers = aggregate(&contacts);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].address, "11 Placed Rd");

        let unplaced = unplaced_contacts(&contacts, GroupingPolicy::Exact);
        assert_eq!(unplaced.len(), 1);
        assert_eq!(unplaced[0].address(), "10 Lone Rd");
    }

    #[test]
    fn ungeocoded_sibling_still_counts() {
        let contacts = vec![
            prospect("2 Oak St unit A", None, 2, false),
            prospect("2 Oak St unit B", Some((3.0, 4.0)), 1, false),
        ];

        let marker = &aggregate(&contacts)[0];
        assert_eq!(marker.coordinate, Coordinate::new(3.0, 4.0));
        assert_eq!(marker.contact_count, 2);
        assert_eq!(marker.total_knocks, 3);
        assert!(unplaced_contacts(&contacts, GroupingPolicy::Exact).is_empty());
    }

    #[test]
    fn first_geocoded_contact_anchors_the_marker() {
        let contacts = vec![
            prospect("6 Elm St", Some((1.0, 1.0)), 0, false),
            prospect("6 Elm St", Some((9.0, 9.0)), 0, false),
        ];

        assert_eq!(aggregate(&contacts)[0].coordinate, Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn exact_policy_keeps_case_variants_apart() {
        let contacts = vec![
            prospect("123 Main St", Some((0.0, 0.0)), 1, false),
            prospect("123 main st", Some((0.0, 0.0)), 1, false),
        ];

        assert_eq!(aggregate(&contacts).len(), 2);

        let folded = aggregate_with(&contacts, GroupingPolicy::FoldCase);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].address, "123 Main St");
        assert_eq!(folded[0].contact_count, 2);
    }

    #[test]
    fn unit_labels_are_not_reconciled() {
        let contacts = vec![
            prospect("9 Bay Rd unit 2", Some((0.0, 0.0)), 0, false),
            prospect("9 Bay Rd unit Unit 2", Some((0.0, 0.0)), 0, false),
        ];

        let marker = &aggregate(&contacts)[0];
        assert_eq!(marker.unit_count, 2);
        assert!(marker.is_multi_unit);
    }

    #[test]
    fn does_not_touch_input() {
        let contacts = vec![customer("1 Elm St", Some((0.0, 0.0)), 1)];
        let snapshot = contacts.clone();
        let first = aggregate(&contacts);
        let second = aggregate(&contacts);
        assert_eq!(first, second);
        assert_eq!(contacts, snapshot);
    }

    fn arb_contact() -> impl Strategy<Value = ContactRecord> {
        (
            0usize..4,
            prop::option::of(0usize..3),
            prop::option::of((-90.0f64..90.0, -180.0f64..180.0)),
            0u32..8,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(street, unit, coordinate, knocks, is_customer, unqualified)| {
                let mut address = format!("{} Test St", street);
                if let Some(unit) = unit {
                    address.push_str(&format!(" unit {}", unit));
                }
                if is_customer {
                    customer(&address, coordinate, knocks)
                } else {
                    prospect(&address, coordinate, knocks, unqualified)
                }
            })
    }

    proptest! {
        #[test]
        fn contacts_are_counted_once_when_placeable(contacts in prop::collection::vec(arb_contact(), 0..40)) {
            let markers = aggregate(&contacts);
            let counted: usize = markers.iter().map(|m| m.contact_count).sum();
            let unplaced = unplaced_contacts(&contacts, GroupingPolicy::Exact).len();
            prop_assert_eq!(counted + unplaced, contacts.len());
        }

        #[test]
        fn presentation_modes_are_exclusive(contacts in prop::collection::vec(arb_contact(), 0..40)) {
            for marker in aggregate(&contacts) {
                prop_assert!(!(marker.is_multi_unit && marker.shows_multi_contact));
                if marker.list == ContactList::Customers {
                    prop_assert!(!marker.is_unqualified);
                }
            }
        }

        #[test]
        fn any_customer_files_the_address_under_customers(
            prospects in prop::collection::vec((prop::option::of(0usize..3), any::<bool>(), 0u32..8), 1..12),
            customer_unit in prop::option::of(0usize..3),
            insert_at in any::<prop::sample::Index>(),
        ) {
            let mut contacts: Vec<ContactRecord> = prospects
                .iter()
                .map(|(unit, unqualified, knocks)| {
                    let address = match unit {
                        Some(unit) => format!("5 Shared Ct unit {}", unit),
                        None => "5 Shared Ct".to_string(),
                    };
                    prospect(&address, Some((0.0, 0.0)), *knocks, *unqualified)
                })
                .collect();
            let address = match customer_unit {
                Some(unit) => format!("5 Shared Ct unit {}", unit),
                None => "5 Shared Ct".to_string(),
            };
            let position = insert_at.index(contacts.len() + 1);
            contacts.insert(position, customer(&address, None, 0));

            let markers = aggregate(&contacts);
            prop_assert_eq!(markers.len(), 1);
            prop_assert_eq!(markers[0].list, ContactList::Customers);
            prop_assert!(!markers[0].is_unqualified);
            prop_assert_eq!(markers[0].contact_count, prospects.len() + 1);
        }
    }
}
