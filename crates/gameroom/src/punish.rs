use super::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tpg_core::*;

/// Per-participant result of one punishment phase: how many fines landed
/// on them and where their savings ended up. One entry per participant,
/// in roster order, fined or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Penalty {
    pub id: PlayerId,
    pub fines: usize,
    pub savings: Coins,
}

impl Penalty {
    /// Coins this participant lost to fines in the phase.
    pub fn fined_amount(&self) -> Coins {
        self.fines as Coins * PUNISH_FINE
    }
}

/// Resolves the peer-punishment sub-phase between settlement and advance.
pub struct Punishment;

impl Punishment {
    /// Charges punishers, then distributes one fine per punisher across
    /// the shuffled defectors in circular round-robin order.
    ///
    /// A punisher only pays the cost while their savings are strictly
    /// positive — a zero-balance punisher acts for free. With no defector
    /// or no punisher, no fines land and costs already paid stay sunk.
    /// Clears nothing: the punisher set and contributions are the
    /// caller's to clear on round advance.
    pub fn execute<R: Rng>(
        ledger: &mut Ledger,
        punishers: &HashSet<PlayerId>,
        rng: &mut R,
    ) -> Vec<Penalty> {
        for id in punishers {
            match ledger.participant(id).map(|p| p.savings()) {
                Some(savings) if savings > 0 => ledger.apply_savings_delta(id, -PUNISH_COST),
                Some(_) => log::debug!("[punish] {} punishes for free at zero savings", id),
                None => log::warn!("[punish] unknown punisher {}", id),
            }
        }
        let known = punishers.iter().filter(|id| ledger.contains(id)).count();
        let mut defectors = ledger
            .iter()
            .filter(|p| p.is_defector())
            .map(|p| p.id().clone())
            .collect::<Vec<_>>();
        let mut fines = std::collections::HashMap::<PlayerId, usize>::new();
        if !defectors.is_empty() && known > 0 {
            defectors.shuffle(rng);
            for i in 0..known {
                let target = &defectors[i % defectors.len()];
                ledger.apply_savings_delta(target, -PUNISH_FINE);
                *fines.entry(target.clone()).or_default() += 1;
            }
        } else {
            log::debug!(
                "[punish] nothing to fine: {} defectors, {} punishers",
                defectors.len(),
                known
            );
        }
        ledger
            .iter()
            .map(|p| Penalty {
                id: p.id().clone(),
                fines: fines.get(p.id()).copied().unwrap_or(0),
                savings: p.savings(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn ledger_with(entries: &[(&str, Coins, Coins)]) -> Ledger {
        // (id, contribution, savings)
        let mut ledger = Ledger::default();
        for (id, contribution, savings) in entries {
            ledger.join(id, id, ID::default());
            ledger.apply_contribution(id, *contribution);
            ledger.apply_savings_delta(id, *savings);
        }
        ledger
    }
    fn punishers(ids: &[&str]) -> HashSet<PlayerId> {
        ids.iter().map(|s| s.to_string()).collect()
    }
    fn penalty<'a>(report: &'a [Penalty], id: &str) -> &'a Penalty {
        report.iter().find(|p| p.id == id).unwrap()
    }

    #[test]
    fn punisher_pays_cost_and_defector_pays_fine() {
        let mut ledger = ledger_with(&[("coop", 4, 5), ("cheap", 1, 5)]);
        let mut rng = SmallRng::seed_from_u64(1);
        let report = Punishment::execute(&mut ledger, &punishers(&["coop"]), &mut rng);
        assert_eq!(penalty(&report, "coop").savings, 4);
        assert_eq!(penalty(&report, "coop").fines, 0);
        assert_eq!(penalty(&report, "cheap").savings, 2);
        assert_eq!(penalty(&report, "cheap").fines, 1);
        assert_eq!(penalty(&report, "cheap").fined_amount(), PUNISH_FINE);
    }
    #[test]
    fn zero_balance_punisher_acts_for_free() {
        let mut ledger = ledger_with(&[("broke", 5, 0), ("cheap", 0, 5)]);
        let mut rng = SmallRng::seed_from_u64(2);
        let report = Punishment::execute(&mut ledger, &punishers(&["broke"]), &mut rng);
        assert_eq!(penalty(&report, "broke").savings, 0);
        assert_eq!(penalty(&report, "cheap").savings, 2);
    }
    #[test]
    fn negative_balance_punisher_is_exempt_too() {
        let mut ledger = ledger_with(&[("debtor", 5, -2), ("cheap", 0, 5)]);
        let mut rng = SmallRng::seed_from_u64(3);
        let report = Punishment::execute(&mut ledger, &punishers(&["debtor"]), &mut rng);
        assert_eq!(penalty(&report, "debtor").savings, -2);
    }
    #[test]
    fn total_fines_equal_punisher_count() {
        let mut ledger = ledger_with(&[
            ("p1", 5, 10),
            ("p2", 5, 10),
            ("p3", 5, 10),
            ("d1", 0, 10),
            ("d2", 2, 10),
        ]);
        let mut rng = SmallRng::seed_from_u64(4);
        let report = Punishment::execute(&mut ledger, &punishers(&["p1", "p2", "p3"]), &mut rng);
        let total = report.iter().map(|p| p.fines).sum::<usize>();
        assert_eq!(total, 3);
        // circular round-robin over 2 shuffled defectors: one takes 2, one takes 1
        let mut counts = [penalty(&report, "d1").fines, penalty(&report, "d2").fines];
        counts.sort();
        assert_eq!(counts, [1, 2]);
    }
    #[test]
    fn fines_can_stack_on_one_defector() {
        let mut ledger = ledger_with(&[("p1", 5, 10), ("p2", 5, 10), ("d1", 0, 10)]);
        let mut rng = SmallRng::seed_from_u64(5);
        let report = Punishment::execute(&mut ledger, &punishers(&["p1", "p2"]), &mut rng);
        assert_eq!(penalty(&report, "d1").fines, 2);
        assert_eq!(penalty(&report, "d1").savings, 10 - 2 * PUNISH_FINE);
    }
    #[test]
    fn no_defectors_sinks_the_cost() {
        let mut ledger = ledger_with(&[("p1", 5, 10), ("coop", 3, 10)]);
        let mut rng = SmallRng::seed_from_u64(6);
        let report = Punishment::execute(&mut ledger, &punishers(&["p1"]), &mut rng);
        assert_eq!(penalty(&report, "p1").savings, 9);
        assert!(report.iter().all(|p| p.fines == 0));
    }
    #[test]
    fn no_punishers_changes_nothing() {
        let mut ledger = ledger_with(&[("d1", 0, 10)]);
        let mut rng = SmallRng::seed_from_u64(7);
        let report = Punishment::execute(&mut ledger, &HashSet::new(), &mut rng);
        assert_eq!(penalty(&report, "d1").savings, 10);
        assert_eq!(penalty(&report, "d1").fines, 0);
    }
    #[test]
    fn unknown_punisher_is_ignored() {
        let mut ledger = ledger_with(&[("d1", 0, 10)]);
        let mut rng = SmallRng::seed_from_u64(8);
        let report = Punishment::execute(&mut ledger, &punishers(&["ghost"]), &mut rng);
        // a punisher that never joined contributes no fine
        assert_eq!(penalty(&report, "d1").fines, 0);
    }
    #[test]
    fn punisher_can_be_fined_as_defector() {
        let mut ledger = ledger_with(&[("both", 1, 10), ("p2", 5, 10)]);
        let mut rng = SmallRng::seed_from_u64(9);
        let report = Punishment::execute(&mut ledger, &punishers(&["both", "p2"]), &mut rng);
        // pays the cost once, then takes both fines as the only defector
        assert_eq!(penalty(&report, "both").fines, 2);
        assert_eq!(penalty(&report, "both").savings, 10 - PUNISH_COST - 2 * PUNISH_FINE);
    }
    #[test]
    fn fines_can_push_savings_negative() {
        let mut ledger = ledger_with(&[("p1", 5, 10), ("d1", 0, 1)]);
        let mut rng = SmallRng::seed_from_u64(10);
        let report = Punishment::execute(&mut ledger, &punishers(&["p1"]), &mut rng);
        assert_eq!(penalty(&report, "d1").savings, 1 - PUNISH_FINE);
    }
}
