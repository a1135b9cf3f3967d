//! Integration tests for eligibility evaluation over YAML scenarios.

use std::{convert::Infallible, future::ready};

use testresult::TestResult;

use estamp::{
    eligibility::{Evaluation, EvaluationSettings, evaluate},
    fixtures::{Fixture, Scenario},
    promotions::{NewPromotion, Promotion, PromotionStatus, PromotionUuid},
    quotas::{RawQuotaRow, aggregate},
    rewards::{Reward, RewardType, RewardUuid},
};

/// Evaluate a scenario with redemption counts served from its fixture.
async fn evaluate_scenario(scenario: &Scenario) -> Result<Evaluation, Infallible> {
    let quotas = aggregate(scenario.rows());

    evaluate(
        scenario.promotions().to_vec(),
        &quotas,
        scenario.settings(),
        |promotion| ready(Ok(scenario.redemption_count(promotion))),
    )
    .await
}

fn uuids(evaluation: &Evaluation) -> Vec<PromotionUuid> {
    evaluation.promotions.iter().map(|p| p.uuid).collect()
}

fn names(scenario: &Scenario, uuids: &[PromotionUuid]) -> Vec<String> {
    uuids
        .iter()
        .map(|uuid| scenario.name_of(*uuid).unwrap_or("?").to_string())
        .collect()
}

#[tokio::test]
async fn only_promotions_with_open_quota_are_eligible() -> TestResult {
    let scenario = Fixture::new().load_scenario("open_and_exhausted")?;

    let eligible = uuids(&evaluate_scenario(&scenario).await?);

    assert_eq!(
        names(&scenario, &eligible),
        names(&scenario, scenario.expected())
    );

    Ok(())
}

#[tokio::test]
async fn per_user_limit_overrides_open_quota() -> TestResult {
    let scenario = Fixture::new().load_scenario("per_user_limit")?;

    let eligible = uuids(&evaluate_scenario(&scenario).await?);

    assert_eq!(eligible, scenario.expected());

    Ok(())
}

#[tokio::test]
async fn eligible_policy_accepts_unmatched_rewards_up_to_maximum() -> TestResult {
    let scenario = Fixture::new().load_scenario("unmatched_eligible")?;

    let evaluation = evaluate_scenario(&scenario).await?;

    assert_eq!(
        names(&scenario, &uuids(&evaluation)),
        vec!["points-only".to_string(), "unmatched".to_string()]
    );
    assert!(evaluation.truncated, "past-maximum was never evaluated");

    Ok(())
}

#[tokio::test]
async fn evaluation_truncates_to_first_hundred_in_listing_order() -> TestResult {
    let rows = [RawQuotaRow {
        account_id: Some("ACCT_1".into()),
        siebel_acct_id: Some("SBL_1".to_string()),
        threshold: Some(10),
        redeemer: None,
    }];
    let quotas = aggregate(&rows);

    let candidates: Vec<Promotion> = (0..150)
        .map(|priority| {
            let mut promotion = NewPromotion {
                status: Some(PromotionStatus::Active),
                priority: Some(150 - priority),
                ..NewPromotion::default()
            }
            .prepare();

            promotion.rewards = vec![Reward {
                uuid: RewardUuid::new(),
                promotion: promotion.uuid,
                kind: RewardType::IncreaseMemberAccount,
                account_id: Some("ACCT_1".into()),
                value: None,
            }];

            promotion
        })
        .collect();

    let evaluation = evaluate(
        candidates.clone(),
        &quotas,
        EvaluationSettings::default(),
        |_| ready(Ok::<_, Infallible>(0)),
    )
    .await?;

    assert_eq!(evaluation.promotions.len(), 100);
    assert!(evaluation.truncated, "fifty candidates were never evaluated");
    assert!(
        evaluation
            .promotions
            .iter()
            .zip(&candidates)
            .all(|(a, b)| a.uuid == b.uuid)
    );

    Ok(())
}
