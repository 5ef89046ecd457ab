use proptest::prelude::*;

use halo_hub::Hub;
use halo_types::{HubParams, Timestamp, UserAddress};

fn addr(n: u8) -> UserAddress {
    UserAddress::new(format!("halo_{:0>40}", n))
}

/// Three users with the signup payout only and arbitrary pairwise trust.
fn seeded_hub(payout: u128, percents: &[u8; 6]) -> Hub {
    let mut hub = Hub::new(HubParams {
        initial_issuance: 0,
        signup_payout: payout,
        ..HubParams::halo_defaults()
    });
    for i in 1..=3u8 {
        hub.signup(&addr(i), "", Timestamp::new(0)).unwrap();
    }
    let pairs = [(1u8, 2u8), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2)];
    for (k, &(i, j)) in pairs.iter().enumerate() {
        hub.trust(&addr(i), &addr(j), percents[k]).unwrap();
    }
    hub
}

fn hop_strategy() -> impl Strategy<Value = (u8, u8, u8, u128)> {
    (1u8..=3, 1u8..=3, 1u8..=3, 0u128..200)
}

proptest! {
    /// Any outcome of `transfer_through` — success or failure — either moves
    /// value while conserving every token's supply, or leaves the whole hub
    /// state bit-identical.
    #[test]
    fn settlement_conserves_or_rolls_back(
        percents in prop::array::uniform6(0u8..=100),
        raw_hops in prop::collection::vec(hop_strategy(), 1..5),
    ) {
        let mut hub = seeded_hub(100, &percents);
        let now = Timestamp::new(0);
        let before = hub.save_state();

        let owners: Vec<_> = raw_hops.iter().map(|h| addr(h.0)).collect();
        let srcs: Vec<_> = raw_hops.iter().map(|h| addr(h.1)).collect();
        let dests: Vec<_> = raw_hops.iter().map(|h| addr(h.2)).collect();
        let amounts: Vec<_> = raw_hops.iter().map(|h| h.3).collect();

        match hub.transfer_through(&owners, &srcs, &dests, &amounts, now) {
            Ok(_) => {
                for owner in [addr(1), addr(2), addr(3)] {
                    let total: u128 = [addr(1), addr(2), addr(3)]
                        .iter()
                        .map(|h| hub.balance_of(&owner, h, now))
                        .sum();
                    prop_assert_eq!(total, 100, "supply of one token changed");
                }
            }
            Err(_) => {
                prop_assert_eq!(
                    hub.save_state(),
                    before,
                    "failed settlement must leave no trace"
                );
            }
        }
    }

    /// check_send_limit is a true upper bound: a single hop at the limit
    /// settles, one unit above it is rejected.
    #[test]
    fn send_limit_is_a_tight_bound(
        percents in prop::array::uniform6(0u8..=100),
    ) {
        let mut hub = seeded_hub(100, &percents);
        let now = Timestamp::new(0);
        let (a, b) = (addr(1), addr(2));

        let limit = hub.check_send_limit(&a, &a, &b, now);
        prop_assert!(limit <= 100);

        let over = hub.transfer_through(
            &[a.clone()], &[a.clone()], &[b.clone()], &[limit + 1], now,
        );
        prop_assert!(over.is_err());

        if limit > 0 {
            hub.transfer_through(&[a.clone()], &[a.clone()], &[b.clone()], &[limit], now)
                .unwrap();
            prop_assert_eq!(hub.balance_of(&a, &b, now), limit);
        }
    }
}
