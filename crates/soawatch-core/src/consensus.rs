//! Majority vote over per-resolver observations.
//!
//! Observations are grouped by serial and the most-voted serial wins. Ties on
//! vote count go to the serial whose best-ranked voter comes first in the
//! resolver priority list; resolvers missing from that list rank after every
//! listed resolver, in observation order. The winner is accepted only if it
//! clears the [`QuorumRule`] threshold over *successful* observations, so a
//! resolver that failed does not count against the others.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ConsensusResult, ResolverObservation, SoaRecord};

/// Vote threshold a serial must reach to be accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuorumRule {
    /// `votes >= ceil(total / 2)`. With an even number of answers, an even
    /// split is accepted and settled by resolver priority.
    #[default]
    CeilHalf,
    /// `votes > total / 2`
    Strict,
}

impl QuorumRule {
    /// Minimum votes required out of `total` successful observations
    #[must_use]
    pub const fn threshold(self, total: usize) -> usize {
        match self {
            Self::CeilHalf => total.div_ceil(2),
            Self::Strict => total / 2 + 1,
        }
    }
}

#[derive(Debug)]
struct Tally {
    votes: usize,
    best_rank: usize,
    soa: SoaRecord,
    voters: Vec<(usize, String)>,
}

/// Vote over one round of observations.
///
/// `priority` is the configured resolver order used to break ties. Failed
/// observations are kept in `samples` but never vote.
#[must_use]
pub fn tally(
    observations: Vec<ResolverObservation>,
    priority: &[String],
    rule: QuorumRule,
) -> ConsensusResult {
    let rank_of = |resolver: &str, position: usize| {
        priority
            .iter()
            .position(|p| p == resolver)
            .unwrap_or(priority.len() + position)
    };

    let mut groups: BTreeMap<u32, Tally> = BTreeMap::new();
    let mut total = 0;

    for (position, obs) in observations.iter().enumerate() {
        let Some(soa) = obs.soa.as_ref().filter(|_| obs.ok) else {
            continue;
        };
        total += 1;
        let rank = rank_of(&obs.resolver, position);

        let entry = groups.entry(soa.serial).or_insert_with(|| Tally {
            votes: 0,
            best_rank: rank,
            soa: soa.clone(),
            voters: Vec::new(),
        });
        entry.votes += 1;
        if rank < entry.best_rank {
            entry.best_rank = rank;
            entry.soa = soa.clone();
        }
        entry.voters.push((rank, obs.resolver.clone()));
    }

    let winner = groups
        .into_iter()
        .max_by(|(_, a), (_, b)| a.votes.cmp(&b.votes).then(b.best_rank.cmp(&a.best_rank)));

    match winner {
        Some((serial, mut group)) => {
            group.voters.sort_by_key(|(rank, _)| *rank);
            ConsensusResult {
                serial: Some(serial),
                soa: Some(group.soa),
                votes: group.votes,
                total,
                quorum: group.votes >= rule.threshold(total),
                sources: group.voters.into_iter().map(|(_, name)| name).collect(),
                samples: observations,
            }
        }
        None => ConsensusResult {
            serial: None,
            soa: None,
            votes: 0,
            total: 0,
            quorum: false,
            sources: Vec::new(),
            samples: observations,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soa(serial: u32) -> SoaRecord {
        SoaRecord {
            primary_ns: "ns1.example.com.".into(),
            admin: "hostmaster.example.com.".into(),
            serial,
            refresh: 7200,
            retry: 3600,
            expire: 1_209_600,
            minimum: 300,
        }
    }

    fn order() -> Vec<String> {
        vec!["cloudflare".into(), "google".into(), "quad9".into()]
    }

    fn round(serials: &[Option<u32>]) -> Vec<ResolverObservation> {
        order()
            .into_iter()
            .zip(serials)
            .map(|(name, serial)| match serial {
                Some(s) => ResolverObservation::success(name, soa(*s)),
                None => ResolverObservation::failure(name, "timeout"),
            })
            .collect()
    }

    #[test]
    fn unanimous() {
        let result = tally(round(&[Some(5), Some(5), Some(5)]), &order(), QuorumRule::CeilHalf);
        assert_eq!(result.accepted(), Some(5));
        assert_eq!((result.votes, result.total), (3, 3));
        assert_eq!(result.sources, order());
    }

    #[test]
    fn two_of_three() {
        let result = tally(round(&[Some(5), Some(5), Some(7)]), &order(), QuorumRule::CeilHalf);
        assert_eq!(result.accepted(), Some(5));
        assert_eq!((result.votes, result.total), (2, 3));
        assert_eq!(result.sources, vec!["cloudflare", "google"]);
    }

    #[test]
    fn three_way_split_has_no_quorum() {
        for rule in [QuorumRule::CeilHalf, QuorumRule::Strict] {
            let result = tally(round(&[Some(5), Some(6), Some(7)]), &order(), rule);
            assert!(!result.quorum);
            assert_eq!(result.accepted(), None);
            assert_eq!(result.total, 3);
        }
    }

    #[test]
    fn failed_resolver_does_not_count() {
        let result = tally(round(&[Some(5), None, Some(5)]), &order(), QuorumRule::CeilHalf);
        assert_eq!(result.accepted(), Some(5));
        assert_eq!((result.votes, result.total), (2, 2));
        assert_eq!(result.samples.len(), 3);
    }

    #[test]
    fn no_successful_resolvers() {
        let result = tally(round(&[None, None, None]), &order(), QuorumRule::CeilHalf);
        assert!(!result.quorum);
        assert_eq!(result.serial, None);
        assert_eq!(result.total, 0);
        assert_eq!(result.samples.len(), 3);
    }

    #[test]
    fn even_split_tie_goes_to_priority() {
        // google answers 9, quad9 answers 8: google is listed first.
        let result = tally(round(&[None, Some(9), Some(8)]), &order(), QuorumRule::CeilHalf);
        assert_eq!(result.accepted(), Some(9));
        assert_eq!(result.sources, vec!["google"]);

        let reversed: Vec<String> = order().into_iter().rev().collect();
        let result = tally(round(&[None, Some(9), Some(8)]), &reversed, QuorumRule::CeilHalf);
        assert_eq!(result.accepted(), Some(8));
    }

    #[test]
    fn strict_rule_rejects_even_split() {
        let result = tally(round(&[None, Some(9), Some(8)]), &order(), QuorumRule::Strict);
        assert_eq!(result.serial, Some(9));
        assert!(!result.quorum);
    }

    #[test]
    fn soa_comes_from_highest_priority_voter() {
        let mut obs = round(&[Some(5), Some(5), Some(5)]);
        obs[0].soa.as_mut().unwrap().primary_ns = "ns-cloudflare.".into();
        obs.reverse();
        let result = tally(obs, &order(), QuorumRule::CeilHalf);
        assert_eq!(result.soa.unwrap().primary_ns, "ns-cloudflare.");
        assert_eq!(result.sources, order());
    }

    #[test]
    fn thresholds() {
        assert_eq!(QuorumRule::CeilHalf.threshold(3), 2);
        assert_eq!(QuorumRule::CeilHalf.threshold(2), 1);
        assert_eq!(QuorumRule::CeilHalf.threshold(1), 1);
        assert_eq!(QuorumRule::Strict.threshold(3), 2);
        assert_eq!(QuorumRule::Strict.threshold(2), 2);
        assert_eq!(QuorumRule::Strict.threshold(4), 3);
    }
}
