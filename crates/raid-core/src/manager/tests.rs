use super::*;
use crate::geometry::Vec3;
use crate::identity::PlayerId;
use crate::kind::{Difficulty, DifficultyFilter};
use crate::loot::LootItem;
use crate::raid::{Completion, DamageVerdict, EntryRefusal, EntryVerdict, RaidState, Roles};
use crate::scheduler::PlacementRequest;
use crate::spawn::SpawnCandidate;
use crate::testing::{MockEconomy, MockHost, MockWorld};
use crate::timer::TimerKind;

const EPOCH: i64 = 1_700_000_000;

fn field() -> Vec<SpawnCandidate> {
    (0..10)
        .map(|i| SpawnCandidate::at(Vec3::flat(-1000.0 + i as f32 * 250.0, 500.0)))
        .collect()
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.seed = Some(11);
    settings.lifecycle.setup_batch = 4;
    settings.lifecycle.despawn_batch = 3;
    settings.lifecycle.despawn_after_completion_secs = 5.0;
    settings.lockout.durations_secs.insert(Difficulty::Easy, 600);
    settings
}

fn profiles() -> Vec<BuildingProfile> {
    let mut fort = BuildingProfile::new("fort", Difficulty::Easy);
    fort.spawns = Some("field".into());
    fort.loot.treasure_amount = 4;
    let mut tower = BuildingProfile::new("tower", Difficulty::Hard);
    tower.spawns = Some("field".into());
    vec![fort, tower]
}

fn tables() -> LootTables {
    LootTables {
        default: vec![
            LootItem::new("rifle", 1),
            LootItem::new("bandage", 5),
            LootItem::new("ammo", 60),
            LootItem::new("note", 1),
        ],
        ..LootTables::default()
    }
}

fn manager_with(settings: Settings) -> RaidManager {
    let mut manager = RaidManager::new(settings, profiles(), tables(), Clock::new(EPOCH));
    manager.load_spawn_file("field", field());
    manager
}

fn manager() -> RaidManager {
    manager_with(settings())
}

fn host() -> MockHost {
    MockHost::with_blueprints(&["fort", "tower"])
}

fn easy() -> PlacementRequest {
    PlacementRequest::new(RaidCategory::Manual, Difficulty::Easy.into())
}

/// Request, paste and tick until the event is open
fn open_event(manager: &mut RaidManager, host: &mut MockHost) -> EventId {
    let id = match manager.request_placement(host, easy()).unwrap() {
        RequestOutcome::Loading(id) => id,
        other => panic!("expected loading, got {:?}", other),
    };
    let request = host.last_paste().unwrap().clone();
    let entities = host.build_base(request.position);
    manager.on_paste_complete(host, request.ticket, entities);
    for _ in 0..3 {
        manager.tick(host, 0.5);
    }
    assert_eq!(manager.event(id).unwrap().state(), RaidState::Open);
    id
}

fn first_with(manager: &RaidManager, id: EventId, roles: Roles) -> EntityId {
    manager
        .event(id)
        .unwrap()
        .entities_with(roles)
        .next()
        .unwrap()
}

#[test]
fn test_placement_opens_with_loot() {
    let mut manager = manager();
    let mut host = host();

    let outcome = manager.request_placement(&mut host, easy()).unwrap();
    let RequestOutcome::Loading(id) = outcome else {
        panic!("expected loading, got {:?}", outcome);
    };
    assert!(manager.is_loading());
    assert_eq!(manager.event(id).unwrap().state(), RaidState::Loading);
    assert_eq!(manager.profiles().references("fort"), 1);

    let request = host.last_paste().unwrap().clone();
    assert_eq!(request.blueprint, "fort");
    assert!(request.options.auto_height);
    let entities = host.build_base(request.position);
    manager.on_paste_complete(&mut host, request.ticket, entities);
    assert!(!manager.is_loading());

    // Seven entities, four per tick
    manager.tick(&mut host, 0.5);
    assert_eq!(manager.event(id).unwrap().state(), RaidState::Loading);
    manager.tick(&mut host, 0.5);
    let event = manager.event(id).unwrap();
    assert_eq!(event.state(), RaidState::Open);

    let report = event.loot_report.clone().unwrap();
    assert_eq!(report.requested, 4);
    assert_eq!(report.placed(), 4);
    let boxed: usize = event
        .entities_with(Roles::LOOT)
        .map(|b| host.inventory.slots_of(b).len())
        .sum();
    assert_eq!(boxed, 4);

    let turret = first_with(&manager, id, Roles::TURRET);
    assert_eq!(host.powered.get(&turret), Some(&false));
    assert!(manager.timers.is_armed(id, TimerKind::Lifetime));
    assert!(manager.timers.is_armed(id, TimerKind::InactivityDespawn));
    assert_eq!(manager.stats().opened.get(&Difficulty::Easy), Some(&1));
}

#[test]
fn test_looting_completes_and_tears_down_in_batches() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);
    let raider = PlayerId(1);

    assert_eq!(
        manager.on_player_enter(&mut host, id, raider, false),
        EntryVerdict::Admitted {
            first_occupant: true
        }
    );
    let wall = first_with(&manager, id, Roles::BUILDING);
    assert_eq!(
        manager.on_entity_damaged(&mut host, wall, Some(raider)),
        DamageVerdict::Allowed { captured: true }
    );

    let boxes: Vec<EntityId> = manager.event(id).unwrap().entities_with(Roles::LOOT).collect();
    for b in &boxes {
        host.inventory.empty(*b);
        manager.on_item_removed(*b, Some(raider));
    }
    assert!(manager.event(id).unwrap().raiders.contains(&raider));

    manager.tick(&mut host, 1.0);
    let event = manager.event(id).unwrap();
    assert_eq!(event.state(), RaidState::Completed);
    assert_eq!(event.completion, Some(Completion::Looted));
    assert_eq!(manager.stats().completions(raider, Difficulty::Easy), 1);

    manager.tick(&mut host, 5.0);
    assert_eq!(manager.event(id).unwrap().state(), RaidState::Despawning);
    assert_eq!(host.killed.len(), 3);
    for b in &boxes {
        assert_eq!(host.drop_chance.get(b), Some(&0.0));
    }
    let now = manager.clock().epoch_secs();
    assert!(manager.lockouts().has_lockout(raider, Difficulty::Easy, now));
    assert!(manager.event_of_entity(wall).is_none());

    manager.tick(&mut host, 1.0);
    manager.tick(&mut host, 1.0);
    assert!(manager.event(id).is_none());
    assert_eq!(host.killed.len(), 7);

    let field = manager.spawn_index("field").unwrap();
    assert_eq!(field.active_count(), 10);
    assert_eq!(field.in_use_count(), 0);
    assert_eq!(manager.profiles().references("fort"), 0);

    manager.tick(&mut host, 600.0);
    let now = manager.clock().epoch_secs();
    assert!(!manager.lockouts().has_lockout(raider, Difficulty::Easy, now));
    assert!(manager.lockouts().is_empty());
}

#[test]
fn test_paste_failure_rolls_back() {
    let mut manager = manager();
    let mut host = host();
    let RequestOutcome::Loading(id) = manager.request_placement(&mut host, easy()).unwrap() else {
        panic!("expected loading");
    };
    let ticket = host.last_paste().unwrap().ticket;

    manager.on_paste_failed(&mut host, ticket);

    assert!(manager.event(id).is_none());
    assert!(!manager.is_loading());
    let field = manager.spawn_index("field").unwrap();
    assert_eq!(field.active_count(), 10);
    assert_eq!(field.in_use_count(), 0);
    assert_eq!(manager.profiles().rotation().used_count(Difficulty::Easy), 0);
    assert_eq!(manager.profiles().references("fort"), 0);
    assert!(manager.lockouts().is_empty());
}

#[test]
fn test_empty_paste_rolls_back() {
    let mut manager = manager();
    let mut host = host();
    let RequestOutcome::Loading(id) = manager.request_placement(&mut host, easy()).unwrap() else {
        panic!("expected loading");
    };
    let ticket = host.last_paste().unwrap().ticket;
    manager.on_paste_complete(&mut host, ticket, Vec::new());
    assert!(manager.event(id).is_none());
    assert_eq!(manager.spawn_index("field").unwrap().active_count(), 10);
}

#[test]
fn test_refused_paste_is_unavailable() {
    let mut manager = manager();
    let mut host = host();
    host.refuse_paste = true;
    let err = manager.request_placement(&mut host, easy()).unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
    assert_eq!(manager.events().count(), 0);
    assert_eq!(manager.spawn_index("field").unwrap().active_count(), 10);
}

#[test]
fn test_teardown_is_idempotent() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);

    assert!(manager.teardown(&mut host, id));
    assert!(!manager.teardown(&mut host, id));
    assert_eq!(manager.event(id).unwrap().completion, Some(Completion::Admin));

    for _ in 0..5 {
        manager.tick(&mut host, 1.0);
    }
    assert!(manager.event(id).is_none());
    assert_eq!(host.killed.len(), 7);
    assert!(!manager.teardown(&mut host, id));
    assert!(manager.lockouts().is_empty());
}

#[test]
fn test_teardown_during_setup_kills_unclassified_entities() {
    let mut manager = manager();
    let mut host = host();
    let RequestOutcome::Loading(id) = manager.request_placement(&mut host, easy()).unwrap() else {
        panic!("expected loading");
    };
    let request = host.last_paste().unwrap().clone();
    let entities = host.build_base(request.position);
    manager.on_paste_complete(&mut host, request.ticket, entities);
    manager.tick(&mut host, 0.5);

    assert!(manager.teardown(&mut host, id));
    for _ in 0..5 {
        manager.tick(&mut host, 1.0);
    }
    assert!(manager.event(id).is_none());
    assert_eq!(host.killed.len(), 7);
    assert_eq!(manager.profiles().rotation().used_count(Difficulty::Easy), 0);
}

#[test]
fn test_second_request_waits_for_the_paste_gate() {
    let mut manager = manager();
    let mut host = host();

    let first = manager.request_placement(&mut host, easy()).unwrap();
    assert!(matches!(first, RequestOutcome::Loading(_)));
    let second = manager.request_placement(&mut host, easy()).unwrap();
    assert_eq!(second, RequestOutcome::Queued(1));
    assert_eq!(host.paste_requests.len(), 1);

    // Still gated
    manager.tick(&mut host, 1.0);
    assert_eq!(manager.pending_requests(), 1);

    let request = host.last_paste().unwrap().clone();
    let entities = host.build_base(request.position);
    manager.on_paste_complete(&mut host, request.ticket, entities);
    manager.tick(&mut host, 1.0);

    assert_eq!(manager.pending_requests(), 0);
    assert_eq!(host.paste_requests.len(), 2);
    let positions: Vec<Vec3> = host.paste_requests.iter().map(|r| r.position).collect();
    assert!(positions[0].distance_xz(positions[1]) >= 100.0);
}

#[test]
fn test_grid_request_waits_for_grid_build() {
    let mut manager = manager();
    let mut host = host();
    host.world = MockWorld::flat(1000.0);

    let outcome = manager
        .request_placement(
            &mut host,
            PlacementRequest::new(RaidCategory::GridManual, DifficultyFilter::Any),
        )
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Queued(1));
    assert!(manager.is_grid_loading());

    for _ in 0..20 {
        manager.tick(&mut host, 1.0);
    }
    assert!(!manager.is_grid_loading());
    assert!(manager.spawn_index(GRID_INDEX).unwrap().count() > 0);
    assert_eq!(host.paste_requests.len(), 1);
    assert_eq!(manager.pending_requests(), 0);
}

#[test]
fn test_purchase_pay_locks_and_refunds_on_failure() {
    let mut settings = settings();
    settings.purchase.enabled = true;
    let mut manager = manager_with(settings);
    let mut host = host();
    let buyer = PlayerId(4);
    let mut economy = MockEconomy::default();
    economy.balances.insert(buyer, 1200.0);
    host.economy = Some(economy);
    host.positions.insert(buyer, Vec3::flat(0.0, 0.0));

    let id = manager.buy_event(&mut host, buyer, Difficulty::Easy).unwrap();
    let event = manager.event(id).unwrap();
    assert_eq!(event.owner, Some(buyer));
    assert!(event.pay_locked);
    assert_eq!(event.category, RaidCategory::Purchased);
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 700.0);

    // The paste fails: the purchase is refunded
    let ticket = host.last_paste().unwrap().ticket;
    manager.on_paste_failed(&mut host, ticket);
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 1200.0);

    // Nowhere to go: charged then refunded
    manager.load_spawn_file("field", Vec::new());
    let err = manager.buy_event(&mut host, buyer, Difficulty::Easy).unwrap_err();
    assert!(matches!(err, Error::ExhaustedSearch { .. }));
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 1200.0);
}

#[test]
fn test_paste_callbacks_after_loading_teardown_release_once() {
    let mut manager = manager();
    let mut host = host();
    let open = open_event(&mut manager, &mut host);
    assert_eq!(manager.profiles().references("fort"), 1);

    let RequestOutcome::Loading(loading) = manager.request_placement(&mut host, easy()).unwrap()
    else {
        panic!("expected loading");
    };
    let ticket = host.last_paste().unwrap().ticket;
    assert_eq!(manager.profiles().references("fort"), 2);

    assert!(manager.teardown(&mut host, loading));
    manager.on_paste_failed(&mut host, ticket);

    assert!(!manager.is_loading());
    assert_eq!(manager.profiles().references("fort"), 1);
    assert!(matches!(
        manager.remove_profile("fort"),
        Err(Error::ProfileInUse(_))
    ));
    manager.tick(&mut host, 1.0);
    assert!(manager.event(loading).is_none());
    assert_eq!(manager.event(open).unwrap().state(), RaidState::Open);
    assert_eq!(manager.profiles().references("fort"), 1);

    // A late paste for a torn down event is undone
    let RequestOutcome::Loading(late) = manager.request_placement(&mut host, easy()).unwrap()
    else {
        panic!("expected loading");
    };
    let request = host.last_paste().unwrap().clone();
    assert!(manager.teardown(&mut host, late));
    let entities = host.build_base(request.position);
    let pasted = entities.len();
    manager.on_paste_complete(&mut host, request.ticket, entities);
    assert_eq!(host.undone.len(), pasted);
    assert!(!manager.is_loading());
    assert_eq!(manager.profiles().references("fort"), 1);
}

#[test]
fn test_purchase_refunded_when_torn_down_before_open() {
    let mut settings = settings();
    settings.purchase.enabled = true;
    let mut manager = manager_with(settings);
    let mut host = host();
    let buyer = PlayerId(4);
    let mut economy = MockEconomy::default();
    economy.balances.insert(buyer, 1200.0);
    host.economy = Some(economy);
    host.positions.insert(buyer, Vec3::flat(0.0, 0.0));

    let id = manager.buy_event(&mut host, buyer, Difficulty::Easy).unwrap();
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 700.0);
    let ticket = host.last_paste().unwrap().ticket;

    assert!(manager.teardown(&mut host, id));
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 1200.0);

    // The failed paste that follows does not pay out twice
    manager.on_paste_failed(&mut host, ticket);
    assert_eq!(host.economy.as_ref().unwrap().balances[&buyer], 1200.0);
    assert_eq!(manager.profiles().references("fort"), 0);
}

#[test]
fn test_purchase_needs_funds_and_economy() {
    let mut settings = settings();
    settings.purchase.enabled = true;
    let mut manager = manager_with(settings);
    let mut host = host();

    let err = manager.buy_event(&mut host, PlayerId(4), Difficulty::Easy).unwrap_err();
    assert!(matches!(err, Error::EconomyUnavailable));

    host.economy = Some(MockEconomy::default());
    let err = manager.buy_event(&mut host, PlayerId(4), Difficulty::Easy).unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { .. }));
    assert!(host.paste_requests.is_empty());
}

#[test]
fn test_intrusion_ejections() {
    let mut lockouts = crate::lockout::Lockouts::new();
    lockouts.set(PlayerId(7), Difficulty::Easy, EPOCH, 3600);
    let mut manager = manager().with_records(lockouts, crate::stats::RaidStats::default());
    let mut host = host();
    let id = open_event(&mut manager, &mut host);

    host.banned.insert(PlayerId(9));
    assert_eq!(
        manager.on_player_enter(&mut host, id, PlayerId(9), false),
        EntryVerdict::Ejected(EntryRefusal::Banned)
    );
    assert_eq!(
        manager.on_player_enter(&mut host, id, PlayerId(8), true),
        EntryVerdict::Ejected(EntryRefusal::Teleported)
    );
    assert!(matches!(
        manager.on_player_enter(&mut host, id, PlayerId(7), false),
        EntryVerdict::Ejected(EntryRefusal::LockedOut { remaining_secs }) if remaining_secs > 0
    ));
    assert_eq!(host.ejected, vec![PlayerId(9), PlayerId(8), PlayerId(7)]);
    assert!(manager.event(id).unwrap().intruders.is_empty());

    assert!(matches!(
        manager.on_player_enter(&mut host, id, PlayerId(1), false),
        EntryVerdict::Admitted { .. }
    ));
    assert_eq!(
        manager.on_player_enter(&mut host, id, PlayerId(1), false),
        EntryVerdict::AlreadyInside
    );
}

#[test]
fn test_hogging_player_is_ejected() {
    let mut manager = manager();
    let mut host = host();
    let first = open_event(&mut manager, &mut host);
    let second = open_event(&mut manager, &mut host);
    let player = PlayerId(1);

    manager.on_player_enter(&mut host, first, player, false);
    let wall = first_with(&manager, first, Roles::BUILDING);
    manager.on_entity_damaged(&mut host, wall, Some(player));
    manager.on_player_exit(first, player);

    assert_eq!(
        manager.on_player_enter(&mut host, second, player, false),
        EntryVerdict::Ejected(EntryRefusal::Hogging(first))
    );
}

#[test]
fn test_capture_locks_loot_to_owner_and_allies() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);
    let (owner, ally, stranger) = (PlayerId(1), PlayerId(2), PlayerId(3));
    host.social.teams.push((owner, ally));

    let wall = first_with(&manager, id, Roles::CAPTURE);
    assert_eq!(
        manager.on_entity_damaged(&mut host, wall, Some(owner)),
        DamageVerdict::Allowed { captured: true }
    );
    let loot = first_with(&manager, id, Roles::LOOT);
    assert!(manager.can_loot(&host, ally, loot));
    assert!(!manager.can_loot(&host, stranger, loot));
    assert_eq!(
        manager.on_entity_damaged(&mut host, wall, Some(stranger)),
        DamageVerdict::Blocked
    );
    assert_eq!(
        manager.on_entity_damaged(&mut host, EntityId(1), Some(stranger)),
        DamageVerdict::NotOurs
    );
}

#[test]
fn test_owner_reset_and_turret_power_off_after_leaving() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);
    let owner = PlayerId(1);
    let turret = first_with(&manager, id, Roles::TURRET);

    manager.on_player_enter(&mut host, id, owner, false);
    assert_eq!(host.powered.get(&turret), Some(&true));
    let wall = first_with(&manager, id, Roles::BUILDING);
    manager.on_entity_damaged(&mut host, wall, Some(owner));
    manager.on_player_exit(id, owner);

    manager.tick(&mut host, 30.0);
    assert_eq!(host.powered.get(&turret), Some(&false));
    assert_eq!(manager.event(id).unwrap().owner, Some(owner));

    manager.tick(&mut host, 600.0);
    assert!(manager.event(id).unwrap().owner.is_none());
    assert!(manager.event(id).unwrap().is_open());
}

#[test]
fn test_inactivity_completes_without_lockouts() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);

    manager.tick(&mut host, 1800.0);
    let event = manager.event(id).unwrap();
    assert_eq!(event.completion, Some(Completion::Inactive));
    assert_eq!(event.state(), RaidState::Completed);

    for _ in 0..5 {
        manager.tick(&mut host, 5.0);
    }
    assert!(manager.event(id).is_none());
    assert!(manager.lockouts().is_empty());
    assert_eq!(manager.stats().completions(PlayerId(1), Difficulty::Easy), 0);
}

#[test]
fn test_npcs_spawn_inactive_and_unregister_on_death() {
    let mut manager = manager();
    let mut host = host();
    let mut fort = manager.profiles().get("fort").unwrap().clone();
    fort.npc.enabled = true;
    fort.npc.amount_min = 2;
    fort.npc.amount_max = 2;
    manager.add_profile(fort);

    let id = open_event(&mut manager, &mut host);
    let actors: Vec<ActorId> = manager.event(id).unwrap().actors.iter().copied().collect();
    assert_eq!(actors.len(), 2);
    assert!(actors.iter().all(|a| host.actor_active.get(a) == Some(&false)));
    assert_eq!(manager.event_of_actor(actors[0]), Some(id));

    assert_eq!(manager.on_actor_killed(actors[0], Some(PlayerId(1))), Some(id));
    assert!(manager.event_of_actor(actors[0]).is_none());
    assert_eq!(manager.event(id).unwrap().actors.len(), 1);

    manager.teardown(&mut host, id);
    assert_eq!(host.actors_killed, vec![actors[1]]);
}

#[test]
fn test_pvp_grace_after_leaving() {
    let mut settings = settings();
    settings.pvp.delay_secs = 10.0;
    let mut manager = manager_with(settings);
    let mut host = host();
    let mut fort = manager.profiles().get("fort").unwrap().clone();
    fort.allow_pvp = true;
    manager.add_profile(fort);
    let id = open_event(&mut manager, &mut host);
    assert!(manager.event(id).unwrap().allow_pvp);
    let (a, b) = (PlayerId(1), PlayerId(2));

    assert_eq!(manager.pvp_verdict(a, b), None);
    manager.on_player_enter(&mut host, id, a, false);
    manager.on_player_enter(&mut host, id, b, false);
    assert_eq!(manager.pvp_verdict(a, b), Some(true));

    manager.on_player_exit(id, b);
    assert_eq!(manager.pvp_verdict(a, b), Some(true));
    manager.tick(&mut host, 10.0);
    assert_eq!(manager.pvp_verdict(a, b), None);
}

#[test]
fn test_unload_destroys_everything() {
    let mut manager = manager();
    let mut host = host();
    host.markers_enabled = true;
    let id = open_event(&mut manager, &mut host);
    assert_eq!(host.markers.len(), 1);

    // A second paste still in flight
    manager.request_placement(&mut host, easy()).unwrap();
    let pending = host.last_paste().unwrap().clone();

    manager.unload(&mut host);
    assert!(manager.event(id).is_none());
    assert_eq!(manager.events().count(), 0);
    assert!(!manager.is_loading());
    assert_eq!(host.killed.len(), 7);
    assert!(host.markers.is_empty());

    let late = host.build_base(pending.position);
    let late_ids: Vec<EntityId> = late.iter().map(|e| e.id).collect();
    manager.on_paste_complete(&mut host, pending.ticket, late);
    assert_eq!(host.undone, late_ids);
}

#[test]
fn test_despawn_nearest_picks_closest() {
    let mut manager = manager();
    let mut host = host();
    let first = open_event(&mut manager, &mut host);
    let second = open_event(&mut manager, &mut host);
    let near_second = manager.event(second).unwrap().position;

    assert_eq!(manager.despawn_nearest(&mut host, near_second), Some(second));
    assert!(manager.event(first).unwrap().is_open());
    assert_eq!(manager.despawn_all(&mut host), 1);
}

#[test]
fn test_reinitialize_keeps_live_events() {
    let mut manager = manager();
    let mut host = host();
    let id = open_event(&mut manager, &mut host);

    let mut changed = settings();
    changed.lifecycle.despawn_batch = 50;
    manager.reinitialize(changed, profiles(), LootTables::default());

    assert_eq!(manager.settings().lifecycle.despawn_batch, 50);
    assert_eq!(manager.profiles().references("fort"), 1);
    assert!(manager.event(id).unwrap().is_open());
    assert!(matches!(
        manager.remove_profile("fort"),
        Err(Error::ProfileInUse(_))
    ));
}
