use super::*;
use crate::config::Config;
use crate::transport::local;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;

fn philosophers(n: usize, config: &Config) -> Vec<Philosopher> {
    local::world(n)
        .into_iter()
        .map(|endpoint| Philosopher::new(endpoint, config).unwrap())
        .collect()
}

fn instant_config() -> Config {
    Config::default().with_delays(Duration::ZERO, Duration::ZERO)
}

async fn join_all<T: Send + 'static>(mut tasks: JoinSet<T>) -> Vec<T> {
    timeout(Duration::from_secs(10), async {
        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            results.push(joined.unwrap());
        }
        results
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn everyone_thinking_is_not_a_deadlock() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(4, &instant_config()) {
        tasks.spawn(async move { philosopher.check_deadlock().await.unwrap() });
    }
    assert!(join_all(tasks).await.into_iter().all(|flag| !flag));
}

#[tokio::test]
async fn everyone_hungry_is_a_deadlock() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(2, &instant_config()) {
        tasks.spawn(async move {
            philosopher.announce_hunger().unwrap();
            let flag = philosopher.check_deadlock().await.unwrap();
            (flag, philosopher.outcome().deadlock_detected)
        });
    }
    for (flag, recorded) in join_all(tasks).await {
        assert!(flag);
        assert!(recorded);
    }
}

#[tokio::test]
async fn one_thinker_breaks_the_deadlock() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(4, &instant_config()) {
        tasks.spawn(async move {
            if philosopher.rank() != 3 {
                philosopher.announce_hunger().unwrap();
            }
            philosopher.check_deadlock().await.unwrap()
        });
    }
    assert!(join_all(tasks).await.into_iter().all(|flag| !flag));
}

#[tokio::test]
async fn slow_eaters_look_deadlocked() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(3, &instant_config()) {
        tasks.spawn(async move {
            philosopher.request_forks().await.unwrap();
            philosopher.eat().await.unwrap();
            philosopher.check_deadlock().await.unwrap()
        });
    }
    assert!(join_all(tasks).await.into_iter().all(|flag| flag));
}

#[tokio::test]
async fn resolution_frees_exactly_one_philosopher() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(5, &instant_config().with_seed(11)) {
        tasks.spawn(async move {
            philosopher.announce_hunger().unwrap();
            assert!(philosopher.check_deadlock().await.unwrap());

            let resolved = philosopher.resolve_deadlock().await.unwrap();
            let after = philosopher.check_deadlock().await.unwrap();
            let everyone = philosopher.all_thinking().await.unwrap();
            (philosopher.rank(), resolved, philosopher.state(), after, everyone)
        });
    }

    let results = join_all(tasks).await;
    let freed: Vec<_> = results
        .iter()
        .filter(|(_, resolved, ..)| resolved.is_some())
        .collect();
    assert_eq!(freed.len(), 1);

    let (target, resolved, state, ..) = freed[0];
    assert_eq!(*resolved, Some(*target));
    assert_eq!(*state, State::Thinking);

    for (rank, _, state, after, everyone) in &results {
        // the freed philosopher is seen thinking by the next check
        assert!(!after);
        assert!(!everyone);
        if rank != target {
            assert_eq!(*state, State::Hungry);
        }
    }
}

#[tokio::test]
async fn two_philosophers_circular_wait_is_broken() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(2, &instant_config()) {
        tasks.spawn(async move {
            philosopher.announce_hunger().unwrap();
            if philosopher.check_deadlock().await.unwrap() {
                philosopher.resolve_deadlock().await.unwrap();
            }
            let after = philosopher.check_deadlock().await.unwrap();

            // the buffered requests now let both waits complete
            philosopher.await_forks().await.unwrap();
            after
        });
    }
    assert!(join_all(tasks).await.into_iter().all(|flag| !flag));
}

#[tokio::test]
async fn stale_target_stays_thinking() {
    let mut tasks = JoinSet::new();
    for mut philosopher in philosophers(3, &instant_config()) {
        tasks.spawn(async move {
            let resolved = philosopher.resolve_deadlock().await.unwrap();
            (resolved, philosopher.state())
        });
    }
    let results = join_all(tasks).await;
    assert_eq!(results.iter().filter(|(r, _)| r.is_some()).count(), 1);
    assert!(results.iter().all(|(_, state)| *state == State::Thinking));
}

#[tokio::test]
async fn resolution_polling_can_time_out() {
    let config = instant_config().with_resolution_timeout(Duration::from_millis(20));
    let mut philosopher = philosophers(2, &config).remove(1);

    let err = await_resolution(&mut philosopher).await.unwrap_err();
    assert!(matches!(err, Error::ResolutionTimeout(_)));
    assert_eq!(philosopher.outcome().resolutions, 0);
}

#[tokio::test]
async fn non_thinking_resolution_payload_is_ignored() {
    let config = instant_config().with_resolution_timeout(Duration::from_millis(20));
    let mut world = philosophers(2, &config);
    let mut target = world.remove(1);
    world[0]
        .endpoint_mut()
        .send_control(1, ControlMessage::resolution(State::Eating))
        .unwrap();

    assert!(await_resolution(&mut target).await.is_err());
    assert_eq!(target.state(), State::Thinking);
    assert_eq!(target.outcome().resolutions, 0);
}
