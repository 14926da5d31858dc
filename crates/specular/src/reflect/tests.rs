use super::*;
use crate::error::ReflectError;
use crate::geom::{Point, Segment};
use crate::model::rand::{draw_model, RandomSceneCfg};
use crate::model::{MirrorId, Model};
use nalgebra::vector;
use proptest::prelude::*;

fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
    Segment::new(vector![x1, y1], vector![x2, y2])
}

fn tree(target: Point, mirrors: Vec<Segment>) -> GroupTree {
    let model = Model::new(vector![0.0, 0.0], target, mirrors).unwrap();
    GroupTree::new(model)
}

fn close(a: &Point, b: &Point) -> bool {
    (a - b).norm() < 1e-9
}

fn child_via(exp: &Expansion, mirror: usize) -> &ReflectionGroup {
    exp.children
        .iter()
        .find(|c| c.occluder() == Some(MirrorId(mirror)))
        .unwrap()
}

#[test]
fn no_mirrors_gives_direct_path_only() {
    let t = tree(vector![10.0, 0.0], vec![]);
    let exp = t.expand(t.root()).unwrap();
    assert!(exp.children.is_empty());
    let path = exp.path.unwrap();
    assert_eq!(path.points(), &[vector![0.0, 0.0], vector![10.0, 0.0]]);
    assert_eq!(path.bounces(), 0);
    assert!((path.length() - 10.0).abs() < 1e-12);
}

#[test]
fn single_mirror_yields_child_and_direct_path() {
    let t = tree(vector![10.0, -5.0], vec![seg(0.0, 5.0, 10.0, 5.0)]);
    let exp = t.expand(t.root()).unwrap();
    assert_eq!(exp.children.len(), 1);
    let child = &exp.children[0];
    assert_eq!(child.level(), 1);
    assert_eq!(child.parent(), Some(GroupTree::ROOT));
    assert_eq!(child.occluder(), Some(MirrorId(0)));
    assert!(close(child.virtual_source(), &vector![0.0, 10.0]));
    assert!(close(child.gate().p1(), &vector![10.0, 5.0]));
    assert!(close(child.gate().p2(), &vector![0.0, 5.0]));
    assert!((child.travelled_distance() - 5.0).abs() < 1e-12);

    let path = exp.path.unwrap();
    assert_eq!(path.points(), &[vector![0.0, 0.0], vector![10.0, -5.0]]);
}

#[test]
fn reflected_child_reaches_target() {
    let mut t = tree(vector![10.0, -5.0], vec![seg(0.0, 5.0, 10.0, 5.0)]);
    let exp = t.expand(t.root()).unwrap();
    let id = t.insert(exp.children[0].clone()).unwrap();
    assert_eq!(id, GroupId(1));

    let exp = t.expand(id).unwrap();
    assert!(exp.children.is_empty());
    let path = exp.path.unwrap();
    assert_eq!(path.bounces(), 1);
    let p = path.points();
    assert!(close(&p[0], &vector![0.0, 0.0]));
    assert!(close(&p[1], &vector![10.0 / 3.0, 5.0]));
    assert!(close(&p[2], &vector![10.0, -5.0]));
    let expected: f64 =
        Point::new(10.0 / 3.0, 5.0).norm() + Point::new(20.0 / 3.0, -10.0).norm();
    assert!((path.length() - expected).abs() < 1e-9);
}

#[test]
fn target_behind_mirror_is_not_reached() {
    let t = tree(vector![0.0, 10.0], vec![seg(-5.0, 5.0, 5.0, 5.0)]);
    let exp = t.expand(t.root()).unwrap();
    assert!(exp.path.is_none());
    assert_eq!(exp.children.len(), 1);
    let child = &exp.children[0];
    assert!(close(child.gate().p1(), &vector![5.0, 5.0]));
    assert!(close(child.gate().p2(), &vector![-5.0, 5.0]));
    assert!(close(child.virtual_source(), &vector![0.0, 10.0]));
}

#[test]
fn split_mirror_yields_one_child_per_half() {
    let t = tree(
        vector![0.0, 10.0],
        vec![seg(-5.0, 5.0, 0.0, 5.0), seg(0.0, 5.0, 5.0, 5.0)],
    );
    let exp = t.expand(t.root()).unwrap();
    assert!(exp.path.is_none());
    assert_eq!(exp.children.len(), 2);

    let left = child_via(&exp, 0);
    assert!(close(left.gate().p1(), &vector![0.0, 5.0]));
    assert!(close(left.gate().p2(), &vector![-5.0, 5.0]));
    let right = child_via(&exp, 1);
    assert!(close(right.gate().p1(), &vector![5.0, 5.0]));
    assert!(close(right.gate().p2(), &vector![0.0, 5.0]));

    let total: f64 = exp.children.iter().map(|c| c.gate().segment().length()).sum();
    assert!((total - 10.0).abs() < 1e-9);
    for c in &exp.children {
        assert!(close(c.virtual_source(), &vector![0.0, 10.0]));
    }
}

// blocker B between source and target, long mirror M above both
fn blocker_scene() -> GroupTree {
    tree(
        vector![4.0, 0.0],
        vec![seg(2.0, -1.0, 2.0, 1.0), seg(-10.0, 3.0, 10.0, 3.0)],
    )
}

#[test]
fn blocker_hides_direct_path_and_clips_upper_mirror() {
    let t = blocker_scene();
    let exp = t.expand(t.root()).unwrap();
    assert!(exp.path.is_none());
    assert_eq!(exp.children.len(), 2);

    let via_b = child_via(&exp, 0);
    assert!(close(via_b.virtual_source(), &vector![4.0, 0.0]));
    assert!(close(via_b.gate().p1(), &vector![2.0, -1.0]));
    assert!(close(via_b.gate().p2(), &vector![2.0, 1.0]));

    let via_m = child_via(&exp, 1);
    assert!(close(via_m.virtual_source(), &vector![0.0, 6.0]));
    assert!((via_m.gate().p1() - vector![6.0, 3.0]).norm() < 1e-6);
    assert!(close(via_m.gate().p2(), &vector![-10.0, 3.0]));
}

#[test]
fn one_bounce_off_upper_mirror_reaches_target() {
    let mut t = blocker_scene();
    let exp = t.expand(t.root()).unwrap();

    let m = t.insert(child_via(&exp, 1).clone()).unwrap();
    let from_m = t.expand(m).unwrap();
    let path = from_m.path.unwrap();
    let p = path.points();
    assert_eq!(p.len(), 3);
    assert!(close(&p[0], &vector![0.0, 0.0]));
    assert!(close(&p[1], &vector![2.0, 3.0]));
    assert!(close(&p[2], &vector![4.0, 0.0]));
    assert_eq!(from_m.children.len(), 1);
    assert_eq!(from_m.children[0].occluder(), Some(MirrorId(0)));
    assert_eq!(from_m.children[0].level(), 2);

    let b = t.insert(child_via(&exp, 0).clone()).unwrap();
    let from_b = t.expand(b).unwrap();
    assert!(from_b.path.is_none());
    assert_eq!(from_b.children.len(), 1);
    assert_eq!(from_b.children[0].occluder(), Some(MirrorId(1)));
}

#[test]
fn expansion_is_repeatable() {
    let mut t = blocker_scene();
    let first = t.expand(t.root()).unwrap();
    assert_eq!(first, t.expand(t.root()).unwrap());
    let id = t.insert(first.children[0].clone()).unwrap();
    assert_eq!(t.expand(id).unwrap(), t.expand(id).unwrap());
}

#[test]
fn unknown_groups_are_rejected() {
    let mut t = blocker_scene();
    assert_eq!(
        t.expand(GroupId(7)).unwrap_err(),
        ReflectError::UnknownGroup(GroupId(7))
    );
    assert!(t.path_to(GroupId(3), &vector![1.0, 1.0]).is_err());

    let exp = t.expand(t.root()).unwrap();
    let grandchild = ReflectionGroup::reflected(
        &exp.children[0],
        GroupId(9),
        MirrorId(0),
        vector![0.0, 0.0],
        Gate::new(vector![2.0, 1.0], vector![2.0, -1.0], &vector![0.0, 0.0]).unwrap(),
    );
    assert_eq!(
        t.insert(grandchild).unwrap_err(),
        ReflectError::UnknownGroup(GroupId(9))
    );
    assert_eq!(t.len(), 1);
}

#[test]
fn unknown_occluders_are_rejected() {
    let mut t = blocker_scene();
    let exp = t.expand(t.root()).unwrap();
    let forged = ReflectionGroup::reflected(
        t.get(t.root()).unwrap(),
        GroupTree::ROOT,
        MirrorId(99),
        vector![0.0, 0.0],
        Gate::new(vector![2.0, 1.0], vector![2.0, -1.0], &vector![0.0, 0.0]).unwrap(),
    );
    assert_eq!(
        t.insert(forged).unwrap_err(),
        ReflectError::UnknownMirror(MirrorId(99))
    );
    assert_eq!(t.len(), 1);
    assert!(t.insert(exp.children[0].clone()).is_ok());
}

#[test]
fn targets_on_the_gate_boundary_are_reached() {
    // (0, -5) lies on the ray from the virtual source through the gate end
    for (target, hit_x) in [
        (vector![0.0, -5.0], 0.0),
        (vector![10.0, 0.0], 5.0),
        (vector![20.0, -5.0], 20.0 / 3.0),
    ] {
        let mut t = tree(target, vec![seg(0.0, 5.0, 10.0, 5.0)]);
        let root = t.expand(t.root()).unwrap();
        assert_eq!(root, t.expand(t.root()).unwrap());
        assert_eq!(root.path.as_ref().unwrap().bounces(), 0);
        assert_eq!(root.children.len(), 1);
        let child = &root.children[0];
        assert!(close(child.virtual_source(), &vector![0.0, 10.0]));
        assert!(close(child.gate().p1(), &vector![10.0, 5.0]));
        assert!(close(child.gate().p2(), &vector![0.0, 5.0]));

        let id = t.insert(child.clone()).unwrap();
        let exp = t.expand(id).unwrap();
        assert_eq!(exp, t.expand(id).unwrap());
        assert!(exp.children.is_empty());
        let path = exp.path.unwrap_or_else(|| panic!("no path to {target:?}"));
        assert_eq!(path.bounces(), 1);
        assert!(close(&path.points()[1], &vector![hit_x, 5.0]), "{target:?}");
    }
}

#[test]
fn gate_orientation_is_checked() {
    let source = vector![0.0, 10.0];
    assert!(Gate::new(vector![10.0, 5.0], vector![0.0, 5.0], &source).is_ok());
    let err = Gate::new(vector![0.0, 5.0], vector![10.0, 5.0], &source).unwrap_err();
    assert!(matches!(err, ReflectError::GateOrientation { .. }));
    // on the supporting line is accepted
    assert!(Gate::new(vector![0.0, 5.0], vector![10.0, 5.0], &vector![5.0, 5.0]).is_ok());
}

#[test]
fn root_group_is_degenerate_at_source() {
    let t = blocker_scene();
    let root = t.get(t.root()).unwrap();
    assert!(root.is_root());
    assert_eq!(root.level(), 0);
    assert!(root.gate().segment().is_degenerate());
    assert_eq!(root.travelled_distance(), 0.0);
    assert_eq!(t.len(), 1);
}

#[test]
fn found_path_counts_bounces() {
    let path = FoundPath::new(vec![
        vector![0.0, 0.0],
        vector![3.0, 4.0],
        vector![6.0, 0.0],
        vector![6.0, -1.0],
    ]);
    assert_eq!(path.bounces(), 2);
    assert!((path.length() - 11.0).abs() < 1e-12);
    let json = serde_json::to_string(&path).unwrap();
    let back: FoundPath = serde_json::from_str(&json).unwrap();
    assert_eq!(back, path);
}

fn check_children(t: &GroupTree, parent: GroupId, exp: &Expansion) -> Result<(), TestCaseError> {
    let level = t.get(parent).unwrap().level();
    for c in &exp.children {
        let occluder = t.model().mirror(c.occluder().unwrap());
        prop_assert_eq!(c.level(), level + 1);
        prop_assert_eq!(c.parent(), Some(parent));
        prop_assert!(c.gate().segment().relative_ccw(c.virtual_source()) >= 0);
        prop_assert!(occluder.pt_line_dist(c.gate().p1()) < 1e-6);
        prop_assert!(occluder.pt_line_dist(c.gate().p2()) < 1e-6);
        let d = c.gate().segment().pt_seg_dist(c.virtual_source());
        prop_assert!((c.travelled_distance() - d).abs() < 1e-12);
    }
    if let Some(path) = &exp.path {
        let p = path.points();
        prop_assert_eq!(p.len(), level + 2);
        prop_assert_eq!(&p[0], t.model().source());
        prop_assert_eq!(&p[p.len() - 1], t.model().target());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_scenes_keep_group_invariants(seed in any::<u64>(), n in 0usize..10) {
        let cfg = RandomSceneCfg { mirrors: n, ..RandomSceneCfg::default() };
        let mut t = GroupTree::new(draw_model(&cfg, seed).unwrap());
        let Ok(root) = t.expand(t.root()) else { return Ok(()) };
        check_children(&t, t.root(), &root)?;
        for c in root.children {
            let id = t.insert(c).unwrap();
            if let Ok(exp) = t.expand(id) {
                check_children(&t, id, &exp)?;
            }
        }
    }

    #[test]
    fn random_scene_expansion_is_repeatable(seed in any::<u64>(), n in 0usize..10) {
        let cfg = RandomSceneCfg { mirrors: n, ..RandomSceneCfg::default() };
        let mut t = GroupTree::new(draw_model(&cfg, seed).unwrap());
        let Ok(root) = t.expand(t.root()) else { return Ok(()) };
        prop_assert_eq!(&root, &t.expand(t.root()).unwrap());
        for c in root.children {
            let id = t.insert(c).unwrap();
            if let Ok(exp) = t.expand(id) {
                prop_assert_eq!(&exp, &t.expand(id).unwrap());
            }
        }
    }
}
