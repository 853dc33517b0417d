use engine::ProductDef;
use thiserror::Error;

use super::actors::Player;
use super::world::{Counter, Gate};

/// Recoverable gameplay refusals. The display text is what the player sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ProgressError {
    #[error("Not enough money for {item}: costs ${cost}, you have ${money}")]
    InsufficientFunds { item: String, cost: u32, money: u32 },
    #[error("You are already checked in")]
    AlreadyCheckedIn,
    #[error("Security: you must check in first")]
    SecurityBlocked,
    #[error("Wrong ticket: {gate} boards {required} passengers only")]
    WrongTicket { gate: String, required: String },
}

pub(crate) fn attempt_check_in(
    player: &mut Player,
    counter: &Counter,
) -> Result<(), ProgressError> {
    if player.checked_in {
        return Err(ProgressError::AlreadyCheckedIn);
    }
    debit(player, &format!("a {} ticket", counter.ticket), counter.cost)?;
    player.checked_in = true;
    player.ticket = Some(counter.ticket.clone());
    Ok(())
}

pub(crate) fn attempt_purchase(
    player: &mut Player,
    product: &ProductDef,
) -> Result<(), ProgressError> {
    debit(player, &product.name, product.cost)?;
    player.purchases.push(product.name.clone());
    Ok(())
}

pub(crate) fn attempt_boarding(player: &Player, gate: &Gate) -> Result<(), ProgressError> {
    if player.ticket.as_deref() == Some(gate.required_ticket.as_str()) {
        return Ok(());
    }
    Err(ProgressError::WrongTicket {
        gate: gate.name.clone(),
        required: gate.required_ticket.clone(),
    })
}

fn debit(player: &mut Player, item: &str, cost: u32) -> Result<(), ProgressError> {
    let Some(remaining) = player.money.checked_sub(cost) else {
        return Err(ProgressError::InsufficientFunds {
            item: item.to_string(),
            cost,
            money: player.money,
        });
    };
    player.money = remaining;
    Ok(())
}

#[cfg(test)]
mod tests {
    use engine::{PlayerDef, Rect};

    use super::*;

    fn player(money: u32) -> Player {
        Player::from_def(&PlayerDef::default(), Some(money))
    }

    fn counter(ticket: &str, cost: u32) -> Counter {
        Counter {
            name: format!("{ticket} Counter"),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            interaction_zone: Rect::new(0.0, 0.0, 10.0, 10.0),
            cost,
            ticket: ticket.to_string(),
        }
    }

    fn gate(required: &str) -> Gate {
        Gate {
            name: format!("Gate {required}"),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            interaction_zone: Rect::new(0.0, 0.0, 10.0, 10.0),
            required_ticket: required.to_string(),
        }
    }

    #[test]
    fn check_in_debits_and_assigns_ticket() {
        let mut player = player(1000);
        attempt_check_in(&mut player, &counter("Business", 200)).expect("check in");

        assert_eq!(player.money, 800);
        assert!(player.checked_in);
        assert_eq!(player.ticket.as_deref(), Some("Business"));
    }

    #[test]
    fn exact_funds_check_in_leaves_zero() {
        let mut player = player(100);
        attempt_check_in(&mut player, &counter("Economy", 100)).expect("check in");
        assert_eq!(player.money, 0);
    }

    #[test]
    fn second_check_in_always_fails_regardless_of_funds() {
        let mut player = player(10_000);
        attempt_check_in(&mut player, &counter("Economy", 100)).expect("first");

        assert_eq!(
            attempt_check_in(&mut player, &counter("Business", 200)),
            Err(ProgressError::AlreadyCheckedIn)
        );
        assert_eq!(
            attempt_check_in(&mut player, &counter("Economy", 0)),
            Err(ProgressError::AlreadyCheckedIn)
        );
        assert_eq!(player.money, 9_900);
        assert_eq!(player.ticket.as_deref(), Some("Economy"));
    }

    #[test]
    fn check_in_without_funds_changes_nothing() {
        let mut player = player(99);
        let result = attempt_check_in(&mut player, &counter("Economy", 100));

        assert!(matches!(
            result,
            Err(ProgressError::InsufficientFunds { cost: 100, money: 99, .. })
        ));
        assert_eq!(player.money, 99);
        assert!(!player.checked_in);
        assert_eq!(player.ticket, None);
    }

    #[test]
    fn purchase_rejected_when_short_of_money() {
        let mut player = player(4);
        let coffee = ProductDef {
            name: "Coffee".to_string(),
            cost: 5,
        };
        let err = attempt_purchase(&mut player, &coffee).expect_err("too poor");

        assert_eq!(player.money, 4);
        assert!(player.purchases.is_empty());
        assert!(err.to_string().contains("Coffee"));
    }

    #[test]
    fn purchase_records_item() {
        let mut player = player(20);
        let ramen = ProductDef {
            name: "Ramen".to_string(),
            cost: 15,
        };
        attempt_purchase(&mut player, &ramen).expect("buy");
        assert_eq!(player.money, 5);
        assert_eq!(player.purchases, vec!["Ramen".to_string()]);
    }

    #[test]
    fn boarding_requires_matching_ticket() {
        let mut player = player(1000);
        assert!(attempt_boarding(&player, &gate("Business")).is_err());

        player.ticket = Some("Economy".to_string());
        let err = attempt_boarding(&player, &gate("Business")).expect_err("mismatch");
        assert!(err.to_string().contains("Business"));

        player.ticket = Some("Business".to_string());
        assert_eq!(attempt_boarding(&player, &gate("Business")), Ok(()));
    }
}
