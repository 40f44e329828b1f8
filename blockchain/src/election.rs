//! Longest/majority chain election
//!
//! Best-effort agreement consistent with the proof-of-work model, not BFT
//! consensus: identical chain copies are clustered by hash, the largest
//! cluster wins, and length breaks ties between clusters

use common::GetHash;
use crypto::Hash128;

use crate::store::BlockChain;

/// Picks the winning chain among the candidates
///
/// Candidates are clustered by the MD5 of their canonical serialization.
/// Among the clusters with the most copies, the one whose tip block number
/// is greatest wins; remaining ties go to the first candidate encountered.
/// Returns the winner's index into `candidates`
pub fn elect(candidates: &[BlockChain]) -> Option<usize> {
    struct Cluster {
        chain_hash: Hash128,
        first_index: usize,
        count: usize,
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let chain_hash = candidate.get_hash();
        match clusters.iter_mut().find(|c| c.chain_hash == chain_hash) {
            Some(cluster) => cluster.count += 1,
            None => clusters.push(Cluster {
                chain_hash,
                first_index: index,
                count: 1,
            }),
        }
    }

    let best_count = clusters.iter().map(|c| c.count).max()?;
    clusters
        .iter()
        .filter(|c| c.count == best_count)
        .max_by_key(|c| {
            // max_by_key keeps the later of equal keys, so order descending
            // by index to favor the first encountered
            (
                candidates[c.first_index].tip_num(),
                usize::MAX - c.first_index,
            )
        })
        .map(|c| c.first_index)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use common::{Block, GetHash};
    use crypto::KeyPair;

    use super::*;

    fn genesis() -> Hash128 {
        Hash128::try_from("83218ac34c1834c26781fe4bde918ee4").unwrap()
    }

    fn chain_of(length: u32, keypair: &KeyPair) -> BlockChain {
        let mut chain = BlockChain::new(genesis());
        let mut prev_hash = genesis();
        for block_num in 1..=length {
            let block = Block {
                block_num,
                prev_hash,
                op_records: Default::default(),
                miner_pub_key: keypair.public_key,
                nonce: block_num,
            };
            prev_hash = block.get_hash();
            chain.save_block(block);
        }
        chain
    }

    #[test]
    fn empty_candidate_list_elects_nothing() {
        assert_eq!(elect(&[]), None);
    }

    #[test]
    fn majority_beats_length() {
        let keypair = KeyPair::generate();
        let long = chain_of(7, &keypair);
        let short = chain_of(5, &keypair);

        let winner = elect(&[long, short.clone(), short]).unwrap();
        assert_eq!(winner, 1);
    }

    #[test]
    fn length_breaks_cluster_ties() {
        let keypair = KeyPair::generate();
        let short = chain_of(5, &keypair);
        let long = chain_of(7, &keypair);

        assert_eq!(elect(&[short, long]).unwrap(), 1);
    }

    #[test]
    fn first_encountered_wins_full_ties() {
        let a = chain_of(4, &KeyPair::generate());
        let b = chain_of(4, &KeyPair::generate());

        assert_eq!(elect(&[a, b]).unwrap(), 0);
    }
}
