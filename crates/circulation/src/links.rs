//! Acquisition links and license tags.
//!
//! The availability rules and the shape of borrow/fulfill links are wire
//! contract: reading apps branch on the `status` attribute and walk the
//! `opds:indirectAcquisition` chain to decide what a borrow will get them.

use crate::api::DeliveryApi;
use crate::router::Router;
use folio_model::{DeliveryMechanism, Hold, Identifier, LicensePool, Loan};
use folio_opds::error::{ErrorKind, Result};
use folio_opds::{AtomXml, ns, rfc3339};

/// The `opds:availability` status of one pool for one patron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityStatus {
    /// On loan to this patron, or borrowable right now.
    Available,
    /// This patron's hold has reached the front of the queue.
    Ready,
    /// Holding, not yet at the front.
    Reserved,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Ready => "ready",
            Self::Reserved => "reserved",
            Self::Unavailable => "unavailable",
        }
    }

    /// The status rules, in order of precedence: an active loan always
    /// wins; a hold is ready at queue position zero and reserved
    /// otherwise; with no personal state, a pool is available when
    /// borrowing never consumes a license or when it has both owned and
    /// free copies.
    pub fn resolve(pool: &LicensePool, loan: Option<&Loan>, hold: Option<&Hold>) -> Self {
        if loan.is_some() {
            return Self::Available;
        }
        if let Some(hold) = hold {
            return if hold.ready() { Self::Ready } else { Self::Reserved };
        }
        if pool.unlimited() || (pool.licenses_available > 0 && pool.licenses_owned > 0) {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// Write the `opds:availability`, `opds:holds` and `opds:copies` tags for
/// one pool. Pools that never consume licenses get the availability tag
/// only; hold and copy counts would be meaningless.
pub fn write_license_tags(
    xml: &mut AtomXml,
    pool: &LicensePool,
    loan: Option<&Loan>,
    hold: Option<&Hold>,
) -> Result<()> {
    let status = AvailabilityStatus::resolve(pool, loan, hold);
    let mut attributes = vec![("status", status.as_str())];
    let since;
    let until;
    let (start, end) = match (loan, hold) {
        (Some(loan), _) => (Some(loan.start), loan.until),
        (None, Some(hold)) => (Some(hold.start), hold.until),
        (None, None) => (None, None),
    };
    if let Some(start) = start {
        since = rfc3339(start)?;
        attributes.push(("since", &since));
    }
    if let Some(end) = end {
        until = rfc3339(end)?;
        attributes.push(("until", &until));
    }
    xml.empty("opds:availability", &attributes)?;

    if pool.unlimited() {
        return Ok(());
    }

    // Vendors report hold positions and queue totals independently and
    // the counts go stale at different rates; reconcile so the patron
    // never sees a position past the end of the queue, and a reserved
    // copy is counted even before the vendor counts it.
    let mut total = pool.patrons_in_hold_queue;
    let position = hold.and_then(|hold| hold.position);
    if let Some(position) = position {
        if position > total {
            total = position;
        }
        if position == 0 && total == 0 {
            total = 1;
        }
    }
    let total = total.to_string();
    let mut attributes = vec![("total", total.as_str())];
    let position_value;
    if let Some(position) = position {
        position_value = position.to_string();
        attributes.push(("position", &position_value));
    }
    xml.empty("opds:holds", &attributes)?;

    let owned = pool.licenses_owned.to_string();
    let available = pool.licenses_available.to_string();
    xml.empty("opds:copies", &[("total", &owned), ("available", &available)])
}

/// Write every acquisition link for one pool, as seen by one patron.
///
/// With an active loan: one fulfill link per usable mechanism (or only
/// the locked-in one), plus a revoke link when the vendor allows early
/// return. Otherwise: open-access links for open-access pools, borrow
/// links for everything else, shaped by whether the vendor fixes the
/// mechanism at borrow time. A pool none of whose mechanisms resolves to
/// a renderable media type raises [`ErrorKind::Unfulfillable`]; an empty
/// acquisition link is never emitted.
pub fn write_acquisition_links(
    xml: &mut AtomXml,
    router: &Router,
    api: Option<&dyn DeliveryApi>,
    pool: &LicensePool,
    identifier: &Identifier,
    loan: Option<&Loan>,
    hold: Option<&Hold>,
) -> Result<()> {
    if let Some(loan) = loan {
        let mechanisms: Vec<&DeliveryMechanism> = match &loan.fulfillment {
            // Fulfillment is locked to one mechanism once used.
            Some(locked) if locked.is_renderable() => vec![locked],
            Some(_) => Vec::new(),
            None => pool.renderable_mechanisms(),
        };
        if mechanisms.is_empty() {
            exn::bail!(ErrorKind::Unfulfillable);
        }
        for mechanism in mechanisms {
            let chain = mechanism.client_chain();
            let href = router.fulfill_url(identifier, mechanism.id);
            write_acquisition_link(
                xml,
                ns::rel::GENERIC_ACQUISITION,
                &href,
                chain.first().copied(),
                &chain[1..],
                pool,
                Some(loan),
                hold,
            )?;
        }
        if api.is_none_or(|api| api.supports_revoke()) {
            xml.empty("link", &[("rel", ns::rel::REVOKE), ("href", &router.revoke_url(identifier))])?;
        }
        return Ok(());
    }

    let mechanisms = pool.renderable_mechanisms();
    if mechanisms.is_empty() {
        exn::bail!(ErrorKind::Unfulfillable);
    }

    if pool.open_access {
        for mechanism in mechanisms {
            let chain = mechanism.client_chain();
            let href = router.fulfill_url(identifier, mechanism.id);
            write_acquisition_link(
                xml,
                ns::rel::OPEN_ACCESS,
                &href,
                chain.first().copied(),
                &chain[1..],
                pool,
                None,
                hold,
            )?;
        }
        return Ok(());
    }

    if api.is_some_and(|api| api.set_mechanism_at_borrow()) {
        for mechanism in mechanisms {
            let href = router.borrow_url(identifier, Some(mechanism.id));
            write_acquisition_link(
                xml,
                ns::rel::BORROW,
                &href,
                Some(ns::mime::ENTRY),
                &mechanism.client_chain(),
                pool,
                None,
                hold,
            )?;
        }
    } else {
        let href = router.borrow_url(identifier, None);
        xml.open(
            "link",
            &[("rel", ns::rel::BORROW), ("href", &href), ("type", ns::mime::ENTRY)],
        )?;
        for mechanism in mechanisms {
            write_indirect_chain(xml, &mechanism.client_chain())?;
        }
        write_license_tags(xml, pool, None, hold)?;
        xml.close("link")?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_acquisition_link(
    xml: &mut AtomXml,
    relation: &str,
    href: &str,
    link_type: Option<&str>,
    indirect: &[&str],
    pool: &LicensePool,
    loan: Option<&Loan>,
    hold: Option<&Hold>,
) -> Result<()> {
    let mut attributes = vec![("rel", relation), ("href", href)];
    if let Some(link_type) = link_type {
        attributes.push(("type", link_type));
    }
    xml.open("link", &attributes)?;
    write_indirect_chain(xml, indirect)?;
    write_license_tags(xml, pool, loan, hold)?;
    xml.close("link")
}

/// Nest one acquisition chain, outermost type first.
fn write_indirect_chain(xml: &mut AtomXml, chain: &[&str]) -> Result<()> {
    let Some((first, rest)) = chain.split_first() else {
        return Ok(());
    };
    if rest.is_empty() {
        xml.empty("opds:indirectAcquisition", &[("type", first)])
    } else {
        xml.open("opds:indirectAcquisition", &[("type", first)])?;
        write_indirect_chain(xml, rest)?;
        xml.close("opds:indirectAcquisition")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{DataSource, media_types};
    use rstest::rstest;
    use time::OffsetDateTime;

    fn make_test_pool(open_access: bool, owned: u32, available: u32) -> LicensePool {
        let mut pool =
            LicensePool::new(Identifier::isbn("9780000000001"), DataSource::new("Overdrive"));
        pool.open_access = open_access;
        pool.licenses_owned = owned;
        pool.licenses_available = available;
        pool
    }

    fn make_test_hold(position: Option<u32>) -> Hold {
        Hold::new(Identifier::isbn("9780000000001"), OffsetDateTime::UNIX_EPOCH, position)
    }

    fn render<F: FnOnce(&mut AtomXml) -> Result<()>>(write: F) -> String {
        let mut xml = AtomXml::new();
        write(&mut xml).unwrap();
        xml.into_string().unwrap()
    }

    #[rstest]
    // An active loan always reads as available.
    #[case(false, 10, 0, true, None, AvailabilityStatus::Available)]
    // Hold at the front of the queue.
    #[case(false, 10, 0, false, Some(0), AvailabilityStatus::Ready)]
    // Holding further back.
    #[case(false, 10, 0, false, Some(4), AvailabilityStatus::Reserved)]
    // Free copy on the shelf.
    #[case(false, 10, 3, false, None, AvailabilityStatus::Available)]
    // Open access never runs out.
    #[case(true, 0, 0, false, None, AvailabilityStatus::Available)]
    // Owned but all copies out.
    #[case(false, 10, 0, false, None, AvailabilityStatus::Unavailable)]
    // A free copy of nothing: zero owned is unavailable.
    #[case(false, 0, 5, false, None, AvailabilityStatus::Unavailable)]
    fn test_availability_status_rules(
        #[case] open_access: bool,
        #[case] owned: u32,
        #[case] available: u32,
        #[case] has_loan: bool,
        #[case] hold_position: Option<u32>,
        #[case] expected: AvailabilityStatus,
    ) {
        let pool = make_test_pool(open_access, owned, available);
        let loan = has_loan
            .then(|| Loan::new(Identifier::isbn("9780000000001"), OffsetDateTime::UNIX_EPOCH));
        let hold = hold_position.map(|position| make_test_hold(Some(position)));
        assert_eq!(AvailabilityStatus::resolve(&pool, loan.as_ref(), hold.as_ref()), expected);
    }

    #[test]
    fn test_license_tags_for_impersonal_view() {
        let mut pool = make_test_pool(false, 100, 50);
        pool.patrons_in_hold_queue = 25;
        let document = render(|xml| write_license_tags(xml, &pool, None, None));
        assert_eq!(
            document,
            "<opds:availability status=\"available\"/>\
             <opds:holds total=\"25\"/>\
             <opds:copies total=\"100\" available=\"50\"/>",
        );
    }

    #[rstest]
    // Reported position past the end of the queue raises the total.
    #[case(Some(30), 25, "<opds:holds total=\"30\" position=\"30\"/>")]
    // Reserved copy not yet counted by the vendor still counts as one.
    #[case(Some(0), 0, "<opds:holds total=\"1\" position=\"0\"/>")]
    #[case(Some(3), 25, "<opds:holds total=\"25\" position=\"3\"/>")]
    fn test_hold_count_reconciliation(
        #[case] position: Option<u32>,
        #[case] queue: u32,
        #[case] expected: &str,
    ) {
        let mut pool = make_test_pool(false, 10, 0);
        pool.patrons_in_hold_queue = queue;
        let hold = make_test_hold(position);
        let document = render(|xml| write_license_tags(xml, &pool, None, Some(&hold)));
        assert!(document.contains(expected), "{document}");
    }

    #[test]
    fn test_open_access_pool_gets_no_counts() {
        let pool = make_test_pool(true, 0, 0);
        let document = render(|xml| write_license_tags(xml, &pool, None, None));
        assert_eq!(document, "<opds:availability status=\"available\"/>");
    }

    #[test]
    fn test_borrow_link_nests_all_mechanisms_when_chosen_at_fulfill() {
        let mut pool = make_test_pool(false, 5, 5);
        pool.delivery_mechanisms = vec![
            DeliveryMechanism::new(1, media_types::EPUB, Some(media_types::ADOBE_DRM)),
            DeliveryMechanism::new(2, media_types::PDF, None),
        ];
        let router = Router::new("https://circ.example");
        let document = render(|xml| {
            write_acquisition_links(xml, &router, None, &pool, &pool.identifier.clone(), None, None)
        });

        assert_eq!(document.matches("rel=\"http://opds-spec.org/acquisition/borrow\"").count(), 1);
        assert!(document.contains(
            "<opds:indirectAcquisition type=\"application/vnd.adobe.adept+xml\">\
             <opds:indirectAcquisition type=\"application/epub+zip\"/>\
             </opds:indirectAcquisition>",
        ));
        assert!(document.contains("<opds:indirectAcquisition type=\"application/pdf\"/>"));
        assert!(document.contains("/works/urn:isbn:9780000000001/borrow\""));
    }

    #[test]
    fn test_one_borrow_link_per_mechanism_when_fixed_at_borrow() {
        struct FixedAtBorrow;
        impl DeliveryApi for FixedAtBorrow {
            fn set_mechanism_at_borrow(&self) -> bool {
                true
            }
        }

        let mut pool = make_test_pool(false, 5, 5);
        pool.delivery_mechanisms = vec![
            DeliveryMechanism::new(1, media_types::EPUB, Some(media_types::ADOBE_DRM)),
            DeliveryMechanism::new(2, media_types::PDF, None),
        ];
        let router = Router::new("https://circ.example");
        let document = render(|xml| {
            write_acquisition_links(
                xml,
                &router,
                Some(&FixedAtBorrow),
                &pool,
                &pool.identifier.clone(),
                None,
                None,
            )
        });
        assert_eq!(document.matches("rel=\"http://opds-spec.org/acquisition/borrow\"").count(), 2);
        assert!(document.contains("/borrow/1\""));
        assert!(document.contains("/borrow/2\""));
    }

    #[test]
    fn test_loan_gets_fulfill_and_revoke_links() {
        let mut pool = make_test_pool(false, 5, 5);
        pool.delivery_mechanisms = vec![
            DeliveryMechanism::new(1, media_types::EPUB, Some(media_types::ADOBE_DRM)),
            DeliveryMechanism::new(2, media_types::PDF, None),
        ];
        let loan = Loan::new(pool.identifier.clone(), OffsetDateTime::UNIX_EPOCH);
        let router = Router::new("https://circ.example");
        let document = render(|xml| {
            write_acquisition_links(xml, &router, None, &pool, &pool.identifier.clone(), Some(&loan), None)
        });

        assert_eq!(document.matches("rel=\"http://opds-spec.org/acquisition\"").count(), 2);
        // Fulfill links advertise the outermost type directly.
        assert!(document.contains("type=\"application/vnd.adobe.adept+xml\""));
        assert!(document.contains("rel=\"http://librarysimplified.org/terms/rel/revoke\""));
        assert!(document.contains("/loans/urn:isbn:9780000000001/revoke"));
    }

    #[test]
    fn test_locked_fulfillment_narrows_to_one_link() {
        let mut pool = make_test_pool(false, 5, 5);
        pool.delivery_mechanisms = vec![
            DeliveryMechanism::new(1, media_types::EPUB, Some(media_types::ADOBE_DRM)),
            DeliveryMechanism::new(2, media_types::PDF, None),
        ];
        let mut loan = Loan::new(pool.identifier.clone(), OffsetDateTime::UNIX_EPOCH);
        loan.fulfillment = Some(pool.delivery_mechanisms[1].clone());
        let router = Router::new("https://circ.example");
        let document = render(|xml| {
            write_acquisition_links(xml, &router, None, &pool, &pool.identifier.clone(), Some(&loan), None)
        });
        assert_eq!(document.matches("rel=\"http://opds-spec.org/acquisition\"").count(), 1);
        assert!(document.contains("/fulfill/2\""));
    }

    #[test]
    fn test_pool_without_renderable_mechanism_is_unfulfillable() {
        let mut pool = make_test_pool(false, 5, 5);
        pool.delivery_mechanisms = vec![DeliveryMechanism::opaque(1, media_types::FINDAWAY_DRM)];
        let router = Router::new("https://circ.example");
        let mut xml = AtomXml::new();
        let err = write_acquisition_links(
            &mut xml,
            &router,
            None,
            &pool,
            &pool.identifier.clone(),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(*err, ErrorKind::Unfulfillable);
    }

    #[test]
    fn test_open_access_links_fulfill_directly() {
        let mut pool = make_test_pool(true, 0, 0);
        pool.delivery_mechanisms = vec![DeliveryMechanism::new(1, media_types::EPUB, None)];
        let router = Router::new("https://circ.example");
        let document = render(|xml| {
            write_acquisition_links(xml, &router, None, &pool, &pool.identifier.clone(), None, None)
        });
        assert!(document.contains("rel=\"http://opds-spec.org/acquisition/open-access\""));
        assert!(document.contains("type=\"application/epub+zip\""));
        assert!(!document.contains("opds:holds"));
    }
}
