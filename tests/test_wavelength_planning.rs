mod common;

use common::{cp, disjoint_pairs, main_pair, optimizer, planned_optimizer};
use optical_path_optimizer::domain::optical_model::network::link::LinkState;
use optical_path_optimizer::domain::optical_model::optimizer::STALE_CATALOG_MESSAGE;
use optical_path_optimizer::domain::optical_model::signal::och_param::{ModulationFormat, OchParam, Rate};
use optical_path_optimizer::domain::optical_model::utils::id::DeviceId;
use optical_path_optimizer::error::Error;

#[test]
fn test_single_pair_candidates_carry_q_margin_and_frequencies() {
    let optimizer = planned_optimizer();
    let candidates = optimizer.calculate_wavelength_paths(&main_pair(), false).unwrap();

    assert_eq!(candidates.len(), 2, "One candidate per WDM route between A/10 and C/10");
    for candidate in &candidates {
        assert_eq!(candidate.kind(), "Single-path");
        let entry = &candidate.entries[0];
        assert_eq!(entry.src_och(), &cp("TP-1/1"));
        assert_eq!(entry.oms_add_port(), &cp("A/10"));
        assert_eq!(entry.oms_drop_port(), &cp("C/10"));
        assert_eq!(entry.dst_och(), &cp("TP-2/1"));
        assert_eq!(entry.och_param, OchParam::new(Rate::R100G, ModulationFormat::DpQpsk));
        assert!((entry.q_value.q - 8.5).abs() < 1e-9);
        assert!((entry.q_value.margin() - 1.5).abs() < 1e-9);

        assert_eq!(entry.signals.len(), 96, "191.35 THz to 196.10 THz in 50 GHz steps");
        let first = entry.signals.iter().next().unwrap();
        assert_eq!(*first.0, 1);
        assert!((first.1.center_frequency_thz() - 191.35).abs() < 1e-9);
    }
    assert_eq!(optimizer.candidates(), candidates, "The result is kept for reservation");
}

#[test]
fn test_two_pairs_yield_disjoint_candidates_only() {
    let optimizer = planned_optimizer();
    let candidates = optimizer.calculate_wavelength_paths(&disjoint_pairs(), false).unwrap();

    // Main via B with tributary via D, and the other way round.
    assert_eq!(candidates.len(), 2);
    for candidate in &candidates {
        assert_eq!(candidate.kind(), "Disjoint-path");
        assert!(candidate.is_disjoint_pair());
        let (main, tributary) = (&candidate.entries[0], &candidate.entries[1]);
        assert_eq!(main.src_och(), &cp("TP-1/1"));
        assert_eq!(tributary.src_och(), &cp("TP-3/1"));
        assert_ne!(main.path.devices()[1], tributary.path.devices()[1], "Legs share transit ROADM");
    }
}

#[test]
fn test_shared_transit_leaves_no_disjoint_candidate() {
    let optimizer = planned_optimizer();
    optimizer.remove_device(&DeviceId::new("D")).unwrap();
    optimizer.calculate_wdm_paths(None, None).unwrap();

    let candidates = optimizer.calculate_wavelength_paths(&disjoint_pairs(), false).unwrap();
    assert!(candidates.is_empty(), "Both legs must pass through B");

    let single = optimizer.calculate_wavelength_paths(&main_pair(), false).unwrap();
    assert_eq!(single.len(), 1);
}

#[test]
fn test_stale_catalog_requires_force() {
    let optimizer = planned_optimizer();
    optimizer.update_link_state(&cp("A/2"), &cp("D/1"), LinkState::Inactive).unwrap();

    let result = optimizer.calculate_wavelength_paths(&main_pair(), false);
    match result {
        Err(Error::PreconditionFailed(message)) => assert_eq!(message, STALE_CATALOG_MESSAGE),
        other => panic!("Expected stale catalog error, got {:?}", other.map(|c| c.len())),
    }

    let forced = optimizer.calculate_wavelength_paths(&main_pair(), true).unwrap();
    assert!(!forced.is_empty());
    assert!(!optimizer.is_recomputation_needed(), "A successful calculation clears the change flag");
    assert!(optimizer.calculate_wavelength_paths(&main_pair(), false).is_ok());
}

#[test]
fn test_ports_are_validated() {
    let optimizer = planned_optimizer();

    let result = optimizer.calculate_wavelength_paths(&[(cp("A/10"), cp("TP-2/1"))], false);
    assert!(matches!(result, Err(Error::InvalidArgument(_))), "ROADM port accepted as Och port");

    let result = optimizer.calculate_wavelength_paths(&[(cp("TP-9/1"), cp("TP-2/1"))], false);
    assert!(matches!(result, Err(Error::PreconditionFailed(_))), "Unknown device accepted");

    let result = optimizer.calculate_wavelength_paths(&[(cp("TP-1/7"), cp("TP-2/1"))], false);
    assert!(matches!(result, Err(Error::PreconditionFailed(_))), "Unknown port accepted");

    let result = optimizer.calculate_wavelength_paths(&[(cp("TP-1/1"), cp("TP-2/1")), (cp("TP-1/1"), cp("TP-4/1"))], false);
    match result {
        Err(Error::InvalidArgument(message)) => assert_eq!(message, "All ports must be different ports."),
        other => panic!("Duplicate port accepted: {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn test_transponder_without_link_is_rejected() {
    let optimizer = planned_optimizer();
    optimizer.update_link_state(&cp("TP-1/1"), &cp("A/10"), LinkState::Inactive).unwrap();

    let result = optimizer.calculate_wavelength_paths(&main_pair(), true);
    assert!(matches!(result, Err(Error::PreconditionFailed(_))));
}

#[test]
fn test_no_catalog_gives_no_candidates() {
    let optimizer = optimizer();
    let candidates = optimizer.calculate_wavelength_paths(&main_pair(), false).unwrap();
    assert!(candidates.is_empty());
}

#[test]
fn test_concurrent_planning_sees_a_whole_catalog() {
    let optimizer = planned_optimizer();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..20 {
                optimizer.calculate_wdm_paths(None, None).unwrap();
            }
        });
        scope.spawn(|| {
            for _ in 0..20 {
                let candidates = optimizer.calculate_wavelength_paths(&main_pair(), false).unwrap();
                assert_eq!(candidates.len(), 2, "Planned against a half-replaced catalog");
            }
        });
    });

    assert!(!optimizer.is_recomputation_needed());
    assert_eq!(optimizer.wdm_paths(Some(&cp("A/10")), Some(&cp("C/10"))).len(), 2);
}
