#[cfg(test)]
mod tests {
    use airride_engine::compressor::{DUAL_PUMP_BELOW_PSI, TANK_HIGH_PSI, TANK_LOW_PSI};
    use airride_engine::corner::TRACK_DEADBAND_PSI;
    use airride_engine::{AirSimulation, Corner, FlowDirection};

    // ========== Long-Run Reservoir Bounds ==========

    #[test]
    fn test_tank_bounded_under_sustained_draw() {
        let mut sim = AirSimulation::with_seed(21);
        for corner in Corner::ALL {
            sim.begin_actuation(corner, FlowDirection::Inflate);
        }

        let mut saw_dual_pump = false;
        for _ in 0..8_000 {
            let summary = sim.tick_core();
            assert!(summary.tank_psi >= 0.0, "tank went negative");
            assert!(
                summary.tank_psi <= TANK_HIGH_PSI + 1e-9,
                "tank exceeded ceiling: {}",
                summary.tank_psi
            );
            if summary.pumps_engaged == 2 {
                saw_dual_pump = true;
                assert!(summary.tank_psi < DUAL_PUMP_BELOW_PSI);
            }
        }

        // Four corners drawing at once must eventually pull the tank into
        // dual-pump territory.
        assert!(saw_dual_pump, "sustained draw never engaged the second pump");
    }

    // ========== Compressor Hysteresis ==========

    #[test]
    fn test_compressor_does_not_flap_between_thresholds() {
        let mut sim = AirSimulation::with_seed(33);

        // Drain below the low threshold with all four corners held open.
        for corner in Corner::ALL {
            sim.begin_actuation(corner, FlowDirection::Inflate);
        }
        while sim.state().tank_psi >= TANK_LOW_PSI - 1.0 {
            sim.tick_core();
        }
        for corner in Corner::ALL {
            sim.end_actuation(corner);
        }

        // Charging phase: active until the ceiling is reached.
        while sim.state().tank_psi < TANK_HIGH_PSI {
            let summary = sim.tick_core();
            if summary.tank_psi < TANK_HIGH_PSI {
                assert!(summary.compressor_active, "compressor quit mid-charge");
            }
        }

        // Decay phase: the compressor must stay off through the whole band
        // between the thresholds, with no flapping near the ceiling.
        while sim.state().tank_psi > TANK_LOW_PSI + 0.5 {
            let summary = sim.tick_core();
            assert!(
                !summary.compressor_active,
                "compressor re-engaged at {} before the low threshold",
                summary.tank_psi
            );
        }
    }

    // ========== Preset Convergence ==========

    #[test]
    fn test_pressures_converge_on_preset_targets() {
        let mut sim = AirSimulation::with_seed(9);
        assert!(sim.apply_preset(1));
        for _ in 0..30_000 {
            sim.tick_core();
        }

        let state = sim.state();
        for i in 0..4 {
            let miss = (state.pressures[i] - state.targets[i]).abs();
            assert!(
                miss <= TRACK_DEADBAND_PSI + 0.2,
                "corner {i} stuck {miss} psi from target"
            );
        }
        assert_eq!(sim.ledger().violations, 0, "reservoir coupling violated");
    }

    // ========== Solenoid Exclusivity (property) ==========

    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Begin(usize, bool),
        End(usize),
        Preset(usize),
        Target(usize, f64),
        Tick,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize, any::<bool>()).prop_map(|(c, inflate)| Op::Begin(c, inflate)),
            (0..4usize).prop_map(Op::End),
            (0..3usize).prop_map(Op::Preset),
            (0..4usize, 0.0..150.0f64).prop_map(|(c, t)| Op::Target(c, t)),
            Just(Op::Tick),
        ]
    }

    proptest! {
        /// No interleaving of gestures, presets, targets, and ticks may ever
        /// leave a corner with both solenoid flags raised.
        #[test]
        fn solenoid_flags_never_both_raised(ops in proptest::collection::vec(arb_op(), 1..200)) {
            let mut sim = AirSimulation::with_seed(0);
            for op in ops {
                match op {
                    Op::Begin(i, inflate) => {
                        let corner = Corner::from_index(i).unwrap();
                        let dir = if inflate {
                            FlowDirection::Inflate
                        } else {
                            FlowDirection::Deflate
                        };
                        sim.begin_actuation(corner, dir);
                    }
                    Op::End(i) => sim.end_actuation(Corner::from_index(i).unwrap()),
                    Op::Preset(slot) => {
                        sim.apply_preset(slot);
                    }
                    Op::Target(i, psi) => sim.set_target(Corner::from_index(i).unwrap(), psi),
                    Op::Tick => {
                        sim.tick_core();
                    }
                }
                for flags in sim.state().solenoids {
                    prop_assert!(
                        !(flags.inflating && flags.deflating),
                        "both solenoids raised on one corner"
                    );
                }
            }
        }
    }
}
