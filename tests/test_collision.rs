use std::collections::BTreeMap;

use space_defender::collision::*;
use space_defender::config::GameConfig;
use space_defender::entities::*;

fn enemy(ids: &mut IdAllocator, x: f32, y: f32, size: f32) -> Enemy {
    Enemy::new(ids.allocate(), x, y, size, 0.0, 10)
}

fn shot(ids: &mut IdAllocator, cx: f32, cy: f32) -> Projectile {
    let cfg = GameConfig::default();
    Projectile::new(
        ids.allocate(),
        PlayerSlot(0),
        cx,
        cy,
        Vec2::new(0.0, -1.0),
        &cfg.projectile,
    )
}

#[test]
fn maps_each_projectile_to_every_overlapping_enemy() {
    let mut ids = IdAllocator::default();
    let e1 = enemy(&mut ids, 0.0, 0.0, 20.0);
    let e2 = enemy(&mut ids, 5.0, 5.0, 20.0);
    let far = enemy(&mut ids, 300.0, 300.0, 20.0);
    let p1 = shot(&mut ids, 10.0, 10.0);
    let p2 = shot(&mut ids, 500.0, 10.0);

    let hits = group_collisions([&p1, &p2], [&e1, &e2, &far]);

    let mut expected = BTreeMap::new();
    expected.insert(p1.id(), vec![e1.id(), e2.id()]);
    assert_eq!(hits, expected);
}

#[test]
fn inactive_members_are_never_tested() {
    let mut ids = IdAllocator::default();
    let mut e = enemy(&mut ids, 0.0, 0.0, 20.0);
    let mut p = shot(&mut ids, 10.0, 10.0);

    e.deactivate();
    assert!(group_collisions([&p], [&e]).is_empty());

    let e = enemy(&mut ids, 0.0, 0.0, 20.0);
    p.deactivate();
    assert!(group_collisions([&p], [&e]).is_empty());
}

#[test]
fn edge_contact_is_not_a_hit() {
    let mut ids = IdAllocator::default();
    // Projectile is 4 wide: centred at 22 it spans 20..24, enemy spans 0..20.
    let e = enemy(&mut ids, 0.0, 0.0, 20.0);
    let p = shot(&mut ids, 22.0, 10.0);
    assert!(group_collisions([&p], [&e]).is_empty());

    let p = shot(&mut ids, 21.9, 10.0);
    assert_eq!(group_collisions([&p], [&e]).len(), 1);
}

#[test]
fn result_is_independent_of_group_order() {
    let mut ids = IdAllocator::default();
    let e1 = enemy(&mut ids, 0.0, 0.0, 20.0);
    let e2 = enemy(&mut ids, 40.0, 0.0, 20.0);
    let p1 = shot(&mut ids, 10.0, 10.0);
    let p2 = shot(&mut ids, 50.0, 10.0);

    let forward = group_collisions([&p1, &p2], [&e1, &e2]);
    let backward = group_collisions([&p2, &p1], [&e1, &e2]);
    assert_eq!(forward, backward);
    assert_eq!(forward[&p1.id()], vec![e1.id()]);
    assert_eq!(forward[&p2.id()], vec![e2.id()]);
}

#[test]
fn single_entity_query() {
    let cfg = GameConfig::default();
    let mut ids = IdAllocator::default();
    let player = Player::spawn(ids.allocate(), PlayerSlot(0), 400.0, 510.0, &cfg);
    let touching = enemy(&mut ids, 390.0, 480.0, 20.0);
    let clear = enemy(&mut ids, 100.0, 100.0, 20.0);

    assert_eq!(collisions_with(&player, [&touching, &clear]), vec![touching.id()]);
    assert!(collisions_with(&player, [&clear]).is_empty());
}

#[test]
fn arenas_can_be_queried_directly() {
    let mut ids = IdAllocator::default();
    let mut enemies: Arena<Enemy> = Arena::new();
    let mut shots: Arena<Projectile> = Arena::new();
    let e = enemy(&mut ids, 0.0, 0.0, 20.0);
    let p = shot(&mut ids, 10.0, 10.0);
    let (eid, pid) = (e.id(), p.id());
    enemies.insert(eid, e);
    shots.insert(pid, p);

    let hits = group_collisions(shots.values(), enemies.values());
    assert_eq!(hits.get(&pid), Some(&vec![eid]));
}
