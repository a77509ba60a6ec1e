//! Ledger counting under concurrency and resets.

use folkreel_core::{AccountId, CredentialId, SubscriptionTier};
use chrono::{Duration, TimeZone, Utc};
use folkreel_quota::{QuotaConfig, QuotaLedger};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_commits_are_not_lost() -> anyhow::Result<()> {
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::default()));
    let account = AccountId::from("grace");
    ledger.ensure_account(&account, SubscriptionTier::Premium);

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let ledger = ledger.clone();
            let account = account.clone();
            tokio::spawn(async move { ledger.commit_generation(&account) })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task??;
    }

    let usage = ledger.account_usage(&account).unwrap();
    assert_eq!(usage.monthly, 100);
    assert_eq!(usage.total, 100);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_reservations_never_exceed_limit() -> anyhow::Result<()> {
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::default()));
    let account = AccountId::from("ada");
    ledger.ensure_account(&account, SubscriptionTier::Basic);

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let ledger = ledger.clone();
            let account = account.clone();
            tokio::spawn(async move {
                match ledger.reserve_generation(&account) {
                    Ok(permit) => {
                        tokio::task::yield_now().await;
                        permit.commit();
                        true
                    }
                    Err(_) => false,
                }
            })
        })
        .collect();
    let mut admitted = 0;
    for task in futures::future::join_all(tasks).await {
        if task? {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 30);
    assert_eq!(ledger.account_usage(&account).unwrap().monthly, 30);
    assert_eq!(ledger.in_flight(&account), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credential_use_respects_daily_cap() -> anyhow::Result<()> {
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::default()));
    let account = AccountId::from("ada");
    let key = CredentialId::from("key-ada");
    ledger.ensure_account(&account, SubscriptionTier::Free);
    ledger.register_credential(&key, &account);

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let ledger = ledger.clone();
            let key = key.clone();
            tokio::spawn(async move { ledger.try_use_credential(&key).is_ok() })
        })
        .collect();
    let accepted = futures::future::join_all(tasks)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(true)))
        .count();

    assert_eq!(accepted, 10);
    assert_eq!(ledger.credential_usage(&key).unwrap().daily, 10);
    Ok(())
}

#[test]
fn test_monthly_reset_zeroes_counts_and_keeps_totals() {
    let ledger = QuotaLedger::new(QuotaConfig::default());
    let accounts: Vec<AccountId> = ["ada", "grace", "linus"]
        .into_iter()
        .map(AccountId::from)
        .collect();
    for (i, account) in accounts.iter().enumerate() {
        ledger.ensure_account(account, SubscriptionTier::Basic);
        for _ in 0..=i {
            ledger.commit_generation(account).unwrap();
        }
    }

    assert_eq!(ledger.reset_all_monthly(), 3);

    for (i, account) in accounts.iter().enumerate() {
        let usage = ledger.account_usage(account).unwrap();
        assert_eq!(usage.monthly, 0);
        assert_eq!(usage.total, i as u64 + 1);
        assert!(ledger.can_generate(account));
    }
}

#[test]
fn test_reset_does_not_release_running_reservations() {
    let ledger = QuotaLedger::new(QuotaConfig::default());
    let account = AccountId::from("ada");
    ledger.ensure_account(&account, SubscriptionTier::Free);
    let permit = ledger.reserve_generation(&account).unwrap();

    ledger.reset_all_monthly();
    assert_eq!(ledger.in_flight(&account), 1);

    let usage = permit.commit();
    assert_eq!(usage.monthly, 1);
    assert_eq!(ledger.in_flight(&account), 0);
}

#[test]
fn test_restored_ledger_keeps_free_cap() {
    let ledger = QuotaLedger::new(QuotaConfig::default());
    let ada = AccountId::from("ada");
    let key = CredentialId::from("ada-key");
    ledger.ensure_account(&ada, SubscriptionTier::Free);
    ledger.register_credential(&key, &ada);
    for _ in 0..3 {
        ledger.try_use_credential(&key).unwrap();
        ledger.reserve_generation(&ada).unwrap().commit();
    }
    let snapshot = ledger.snapshot();

    let restarted = QuotaLedger::new(QuotaConfig::default());
    restarted.ensure_account(&ada, SubscriptionTier::Free);
    restarted.register_credential(&key, &ada);
    assert_eq!(restarted.restore(snapshot, Utc::now()), 1);

    assert!(!restarted.can_generate(&ada));
    assert!(restarted.reserve_generation(&ada).is_err());
    assert_eq!(restarted.account_usage(&ada).unwrap().total, 3);
    assert_eq!(restarted.credential_usage(&key).unwrap().daily, 3);
}

#[test]
fn test_restore_applies_missed_resets() {
    let ledger = QuotaLedger::new(QuotaConfig::default());
    let ada = AccountId::from("ada");
    let key = CredentialId::from("ada-key");
    ledger.ensure_account(&ada, SubscriptionTier::Free);
    ledger.register_credential(&key, &ada);
    ledger.commit_generation(&ada).unwrap();
    ledger.commit_credential_use(&key).unwrap();

    let mut snapshot = ledger.snapshot();
    snapshot.saved_at = Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap();

    // Same day: nothing missed.
    let same_day = QuotaLedger::new(QuotaConfig::default());
    same_day.restore(snapshot.clone(), snapshot.saved_at + Duration::hours(1));
    assert_eq!(same_day.account_usage(&ada).unwrap().monthly, 1);
    assert_eq!(same_day.credential_usage(&key).unwrap().daily, 1);

    // Across the month boundary: both counters start over, totals stay.
    let next_month = QuotaLedger::new(QuotaConfig::default());
    next_month.restore(snapshot.clone(), snapshot.saved_at + Duration::hours(3));
    let usage = next_month.account_usage(&ada).unwrap();
    assert_eq!(usage.monthly, 0);
    assert_eq!(usage.total, 1);
    assert_eq!(next_month.credential_usage(&key).unwrap().daily, 0);
    assert_eq!(next_month.credential_usage(&key).unwrap().total, 1);
}

#[test]
fn test_restore_keeps_current_tier_and_reservations() {
    let ledger = QuotaLedger::new(QuotaConfig::default());
    let ada = AccountId::from("ada");
    ledger.ensure_account(&ada, SubscriptionTier::Free);
    ledger.commit_generation(&ada).unwrap();
    let snapshot = ledger.snapshot();

    let restarted = QuotaLedger::new(QuotaConfig::default());
    restarted.ensure_account(&ada, SubscriptionTier::Basic);
    let permit = restarted.reserve_generation(&ada).unwrap();
    restarted.restore(snapshot, Utc::now());

    let usage = restarted.account_usage(&ada).unwrap();
    assert_eq!(usage.tier, SubscriptionTier::Basic);
    assert_eq!(usage.monthly, 1);
    assert_eq!(restarted.in_flight(&ada), 1);
    assert_eq!(permit.commit().monthly, 2);
}
