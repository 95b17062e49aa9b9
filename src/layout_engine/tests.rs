use crate::common::config::{FloatRule, GapSettings, LayoutSettings};
use crate::layout_engine::tiler::movements_are_valid;
use crate::layout_engine::{
    AutoTiler, Deferred, LayoutError, MoveBy, Node, Orientation, Tiler, movement,
};
use crate::model::{Entity, Tags, Windows, WorkspaceId};
use crate::sys::executor::Scheduler;
use crate::sys::geometry::{Point, Rect};
use crate::sys::headless::{HeadlessWindowSystem, WindowSpec};

const SCREEN: Rect = Rect { x: 0, y: 0, width: 1920, height: 1080 };

fn r(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h) }

fn host() -> HeadlessWindowSystem { host_with(LayoutSettings::default()) }

fn host_with(settings: LayoutSettings) -> HeadlessWindowSystem {
    let mut host = HeadlessWindowSystem::with_settings(settings);
    host.add_monitor(SCREEN);
    host
}

/// Opens a window the way the event loop would: tile it, then focus it.
fn open(at: &mut AutoTiler, host: &mut HeadlessWindowSystem) -> Entity {
    let window = host.spawn(WindowSpec::default());
    at.auto_tile(host, window, false);
    host.focus(window);
    window
}

fn rect(host: &HeadlessWindowSystem, window: Entity) -> Rect {
    host.rect(window).unwrap()
}

/// A on the left half, B over C on the right half.
fn three_windows(at: &mut AutoTiler, host: &mut HeadlessWindowSystem) -> (Entity, Entity, Entity) {
    let a = open(at, host);
    let b = open(at, host);
    let c = open(at, host);
    (a, b, c)
}

mod attach {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn first_window_fills_the_monitor() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        assert_eq!(rect(&host, a), SCREEN);
        assert!(at.forest.find_toplevel(WorkspaceId::default()).is_some());
    }

    #[test]
    fn second_window_splits_the_first_in_half() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
        assert_eq!(at.forest.forks.len(), 1);
    }

    #[test]
    fn third_window_splits_the_focused_window_across_its_longer_axis() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 540));
        assert_eq!(rect(&host, c), r(960, 540, 960, 540));

        let child = at.forest.attached(c).unwrap();
        assert_eq!(at.forest.attached(b), Some(child));
        assert_eq!(at.forest.forks[child].orientation, Orientation::Vertical);
        assert!(at.forest.parent(child).is_some());
    }

    #[test]
    fn windows_on_other_workspaces_start_their_own_tree() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = host.spawn(WindowSpec { workspace: WorkspaceId::new(0, 1), ..Default::default() });
        at.auto_tile(&mut host, b, false);

        assert_eq!(rect(&host, a), SCREEN);
        assert_eq!(rect(&host, b), SCREEN);
        assert_ne!(at.forest.attached(a), at.forest.attached(b));
        assert_eq!(at.forest.toplevels().count(), 2);
    }

    #[test]
    fn minimized_focus_is_not_split() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        host.set_minimized(b, true);
        let c = open(&mut at, &mut host);

        // C lands on the largest window instead of the minimized focus.
        assert_eq!(at.forest.attached(c), at.forest.attached(a));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
    }
}

mod detach {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn closing_a_window_restores_the_previous_layout() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);

        at.detach_window(&mut host, c);
        assert!(!at.forest.is_attached(c));
        assert_eq!(at.forest.forks.len(), 1);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));

        at.detach_window(&mut host, b);
        assert_eq!(rect(&host, a), SCREEN);

        at.detach_window(&mut host, a);
        assert!(at.forest.forks.is_empty());
        assert_eq!(at.forest.find_toplevel(WorkspaceId::default()), None);
    }

    #[test]
    fn detaching_the_left_of_a_toplevel_keeps_the_toplevel() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);
        let toplevel = at.forest.attached(a).unwrap();

        at.detach_window(&mut host, a);
        assert_eq!(at.forest.find_toplevel(WorkspaceId::default()), Some(toplevel));
        assert_eq!(at.forest.attached(b), Some(toplevel));
        assert_eq!(at.forest.attached(c), Some(toplevel));
        assert_eq!(rect(&host, b), r(0, 0, 1920, 540));
        assert_eq!(rect(&host, c), r(0, 540, 1920, 540));
    }

    #[test]
    fn detaching_an_unattached_window_is_harmless() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let stray = host.spawn(WindowSpec::default());
        at.detach_window(&mut host, stray);
        assert_eq!(rect(&host, a), SCREEN);
        assert_eq!(at.forest.forks.len(), 1);
    }
}

mod tiling {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn measuring_twice_gives_the_same_layout() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, _, _) = three_windows(&mut at, &mut host);
        let toplevel = at.forest.attached(a).unwrap();
        let area = at.forest.forks[toplevel].area;

        let first = at.forest.measure(&host, toplevel, area);
        let second = at.forest.measure(&host, toplevel, area);
        assert_eq!(first, second);
        assert_eq!(first.windows.len(), 3);
    }

    #[test]
    fn arrange_skips_windows_already_in_place() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        three_windows(&mut at, &mut host);
        host.take_moves();

        at.forest.arrange(&mut host, 0, false);
        assert_eq!(host.take_moves(), vec![]);

        at.forest.arrange(&mut host, 0, true);
        assert_eq!(host.take_moves().len(), 3);
    }

    #[test]
    fn inner_gaps_separate_siblings() {
        let settings = LayoutSettings { gaps: GapSettings { inner: 8, outer: 0 }, ..Default::default() };
        let (mut at, mut host) = (AutoTiler::default(), host_with(settings));
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        assert_eq!(rect(&host, a), r(0, 0, 956, 1080));
        assert_eq!(rect(&host, b), r(964, 0, 956, 1080));
    }

    #[test]
    fn toggle_orientation_flips_the_split() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        at.toggle_orientation(&mut host, a);
        assert_eq!(rect(&host, a), r(0, 0, 1920, 540));
        assert_eq!(rect(&host, b), r(0, 540, 1920, 540));

        at.toggle_orientation(&mut host, a);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
    }

    #[test]
    fn toggle_orientation_rejects_maximized_windows() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        open(&mut at, &mut host);
        host.set_maximized(a, true);
        assert_eq!(at.try_toggle_orientation(&mut host, a), Err(LayoutError::Maximized));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn work_area_changes_rescale_the_tree() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        host.set_work_area(0, r(0, 40, 1920, 1040));
        at.refresh_toplevels(&mut host, Some(0));
        assert_eq!(rect(&host, a), r(0, 40, 960, 1040));
        assert_eq!(rect(&host, b), r(960, 40, 960, 1040));
    }
}

mod smart_gaps {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn settings() -> LayoutSettings {
        LayoutSettings { gaps: GapSettings { inner: 8, outer: 8 }, smart_gaps: true, ..Default::default() }
    }

    #[test]
    fn lone_window_has_no_outer_gap() {
        let (mut at, mut host) = (AutoTiler::default(), host_with(settings()));
        let a = open(&mut at, &mut host);
        assert_eq!(rect(&host, a), SCREEN);
    }

    #[test]
    fn outer_gap_returns_with_a_second_window_and_leaves_with_it() {
        let (mut at, mut host) = (AutoTiler::default(), host_with(settings()));
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        assert_eq!(rect(&host, a), r(8, 8, 948, 1064));
        assert_eq!(rect(&host, b), r(964, 8, 948, 1064));

        at.detach_window(&mut host, b);
        assert_eq!(rect(&host, a), SCREEN);
        let toplevel = at.forest.attached(a).unwrap();
        assert!(at.forest.forks[toplevel].smart_gapped);
    }

    #[test]
    fn turning_smart_gaps_off_restores_the_outer_gap() {
        let (mut at, mut host) = (AutoTiler::default(), host_with(settings()));
        let a = open(&mut at, &mut host);

        host.set_settings(LayoutSettings { smart_gaps: false, ..settings() });
        at.refresh_settings(&mut host);
        assert_eq!(rect(&host, a), r(8, 8, 1904, 1064));
    }
}

mod swap {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn attach_swap_exchanges_positions() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);

        at.attach_swap(&mut host, a, c);
        assert_eq!(rect(&host, c), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, a), r(960, 540, 960, 540));
        assert_eq!(rect(&host, b), r(960, 0, 960, 540));
        assert_eq!(at.forest.attached(a), at.forest.attached(b));
    }

    #[test]
    fn swap_with_unattached_window_changes_nothing() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        open(&mut at, &mut host);
        let stray = host.spawn(WindowSpec::default());
        let before = at.forest.draw_tree();

        assert_eq!(at.try_attach_swap(&mut host, a, stray), Err(LayoutError::WindowNotAttached(stray)));
        assert_eq!(at.forest.draw_tree(), before);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn swap_with_closed_window_changes_nothing() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        host.destroy(b);

        assert_eq!(at.try_attach_swap(&mut host, a, b), Err(LayoutError::WindowMissing(b)));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }
}

mod stacks {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn stacked_windows_share_the_content_rect() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let c = host.spawn(WindowSpec::default());
        assert!(at.attach_to_window(&mut host, b, c, MoveBy::Stack));

        let stack = at.forest.stack_of(b).unwrap();
        assert_eq!(at.forest.stack_of(c), Some(stack));
        assert_eq!(rect(&host, b), r(960, 24, 960, 1056));
        assert_eq!(rect(&host, c), r(960, 24, 960, 1056));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(at.forest.stacks[stack].tab_rect(), r(960, 0, 960, 24));

        assert!(host.is_visible(c));
        assert!(!host.is_visible(b));
    }

    #[test]
    fn closing_the_active_tab_returns_to_the_previous_one() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = host.spawn(WindowSpec::default());
        let c = host.spawn(WindowSpec::default());
        at.attach_to_window(&mut host, a, b, MoveBy::Stack);
        at.attach_to_window(&mut host, a, c, MoveBy::Stack);

        let stack = at.forest.stack_of(a).unwrap();
        at.forest.stacks[stack].activate(&mut host, a);
        at.forest.stacks[stack].activate(&mut host, c);

        at.detach_window(&mut host, c);
        assert_eq!(at.forest.stacks[stack].tabs, vec![a, b]);
        assert_eq!(at.forest.stacks[stack].active, a);
        assert!(host.is_visible(a));
        assert!(!host.is_visible(b));
    }

    #[test]
    fn stack_contracts_to_a_window_when_one_member_remains() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let c = host.spawn(WindowSpec::default());
        at.attach_to_window(&mut host, b, c, MoveBy::Stack);

        at.detach_window(&mut host, c);
        assert_eq!(at.forest.stack_of(b), None);
        assert!(at.forest.stacks.is_empty());
        let (_, _, node) = at.forest.slot_of(b).unwrap();
        assert_eq!(node, Node::Window(b));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
        assert!(host.is_visible(b));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn dropping_below_a_stack_splits_beside_the_whole_stack() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let c = host.spawn(WindowSpec::default());
        at.attach_to_window(&mut host, b, c, MoveBy::Stack);

        let d = host.spawn(WindowSpec::default());
        let below = MoveBy::Cursor { orientation: Orientation::Vertical, swap: false };
        assert!(at.attach_to_window(&mut host, b, d, below));

        assert_eq!(at.forest.stack_of(d), None);
        assert_eq!(at.forest.stack_of(b), at.forest.stack_of(c));
        assert_eq!(at.forest.attached(d), at.forest.attached(b));
        assert_eq!(rect(&host, b), r(960, 24, 960, 516));
        assert_eq!(rect(&host, d), r(960, 540, 960, 540));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn toggle_stacking_wraps_and_unwraps() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (_, b, c) = three_windows(&mut at, &mut host);

        at.toggle_stacking(&mut host, b);
        let stack = at.forest.stack_of(b).unwrap();
        assert_eq!(at.forest.stacks[stack].tabs, vec![b]);
        assert_eq!(rect(&host, b), r(960, 24, 960, 516));

        at.toggle_stacking(&mut host, b);
        assert_eq!(at.forest.stack_of(b), None);
        assert_eq!(rect(&host, b), r(960, 0, 960, 540));
        assert_eq!(rect(&host, c), r(960, 540, 960, 540));
    }

    #[test]
    fn unstacking_splits_members_into_forks() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let c = host.spawn(WindowSpec::default());
        at.attach_to_window(&mut host, b, c, MoveBy::Stack);

        at.toggle_stacking(&mut host, c);
        assert!(at.forest.stacks.is_empty());
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 540));
        assert_eq!(rect(&host, c), r(960, 540, 960, 540));
        assert!(host.is_visible(b));
        assert!(host.is_visible(c));
    }
}

mod drops {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn dropping_on_a_siblings_far_edge_reorders_the_fork() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        assert!(at.place_or_stack(&mut host, b, a, Point::new(10, 540)));
        assert_eq!(rect(&host, b), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, a), r(960, 0, 960, 1080));
    }

    #[test]
    fn dropping_beside_a_tall_window_splits_it_evenly() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let c = host.spawn(WindowSpec::default());

        let beside = MoveBy::Cursor { orientation: Orientation::Horizontal, swap: false };
        assert!(at.attach_to_window(&mut host, b, c, beside));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 480, 1080));
        assert_eq!(rect(&host, c), r(1440, 0, 480, 1080));
    }

    #[test]
    fn dropping_on_a_siblings_bottom_edge_reorients_the_fork() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        at.place_or_stack(&mut host, a, b, Point::new(960, 1070));
        assert_eq!(rect(&host, b), r(0, 0, 1920, 540));
        assert_eq!(rect(&host, a), r(0, 540, 1920, 540));
    }

    #[test]
    fn dropping_on_the_center_stacks() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        assert!(at.place_or_stack(&mut host, b, a, SCREEN.center()));
        let stack = at.forest.stack_of(a).unwrap();
        assert_eq!(at.forest.stacks[stack].tabs, vec![a, b]);
        assert_eq!(rect(&host, b), r(0, 24, 1920, 1056));
    }

    #[test]
    fn dropping_within_a_stack_reorders_tabs() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = host.spawn(WindowSpec::default());
        let c = host.spawn(WindowSpec::default());
        at.attach_to_window(&mut host, a, b, MoveBy::Stack);
        at.attach_to_window(&mut host, a, c, MoveBy::Stack);
        let stack = at.forest.stack_of(a).unwrap();
        assert_eq!(at.forest.stacks[stack].tabs, vec![a, b, c]);

        at.place_or_stack(&mut host, c, a, Point::new(5, 540));
        assert_eq!(at.forest.stacks[stack].tabs, vec![c, a, b]);
    }
}

mod resize {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn drag(at: &mut AutoTiler, host: &mut HeadlessWindowSystem, window: Entity, to: Rect) -> bool {
        let from = rect(host, window);
        let fork = at.forest.attached(window).unwrap();
        let movements = movement::calculate(from, to);
        if !movements_are_valid(&at.forest, window, &movements) {
            return false;
        }
        for m in movements {
            at.forest.resize(host, fork, window, m, to);
        }
        true
    }

    #[test]
    fn dragging_an_inner_edge_moves_the_split() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        assert!(drag(&mut at, &mut host, a, r(0, 0, 1100, 1080)));
        assert_eq!(rect(&host, a), r(0, 0, 1100, 1080));
        assert_eq!(rect(&host, b), r(1100, 0, 820, 1080));
    }

    #[test]
    fn dragging_a_nested_edge_moves_the_nested_split() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);

        assert!(drag(&mut at, &mut host, b, r(960, 0, 960, 700)));
        assert_eq!(rect(&host, b), r(960, 0, 960, 700));
        assert_eq!(rect(&host, c), r(960, 700, 960, 380));
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn dragging_from_below_walks_up_to_the_matching_fork() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, _, c) = three_windows(&mut at, &mut host);

        // C's left edge is the toplevel's split, not its own fork's.
        assert!(drag(&mut at, &mut host, c, r(800, 540, 1120, 540)));
        assert_eq!(rect(&host, a), r(0, 0, 800, 1080));
        assert_eq!(rect(&host, c), r(800, 540, 1120, 540));
    }

    #[test]
    fn edges_on_the_workspace_boundary_cannot_move() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        open(&mut at, &mut host);

        assert!(!drag(&mut at, &mut host, a, r(100, 0, 860, 1080)));
        assert!(!drag(&mut at, &mut host, a, r(50, 50, 960, 1080)));
    }

    #[test]
    fn split_never_passes_the_minimum_ratio() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        drag(&mut at, &mut host, a, r(0, 0, 1900, 1080));
        assert_eq!(rect(&host, a), r(0, 0, 1728, 1080));
        assert_eq!(rect(&host, b), r(1728, 0, 192, 1080));
    }
}

mod keyboard {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::Direction;
    use crate::layout_engine::tiler::RESIZE_STEP;

    #[test]
    fn resize_grows_toward_direction() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        host.focus(a);

        let mut tiler = Tiler::new();
        tiler.resize(&mut at, &mut host, Direction::Right, false);
        assert_eq!(rect(&host, a), r(0, 0, 960 + RESIZE_STEP, 1080));
        assert_eq!(rect(&host, b), r(960 + RESIZE_STEP, 0, 960 - RESIZE_STEP, 1080));

        tiler.resize(&mut at, &mut host, Direction::Left, true);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
    }

    #[test]
    fn resize_past_the_workspace_edge_is_refused() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        open(&mut at, &mut host);
        host.focus(a);
        host.take_moves();

        Tiler::new().resize(&mut at, &mut host, Direction::Left, false);
        assert_eq!(host.take_moves(), vec![]);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }

    #[test]
    fn moving_onto_a_sibling_swaps_branches() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        host.focus(a);

        let (mut tiler, mut deferred) = (Tiler::new(), Scheduler::new());
        tiler.move_right(&at, &host, None);
        tiler.run_queue(&mut at, &mut host, &mut deferred);
        assert_eq!(rect(&host, a), r(960, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(0, 0, 960, 1080));
        assert_eq!(deferred.take(), vec![Deferred::Activate(a)]);
    }

    #[test]
    fn moving_a_given_window_ignores_focus() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let floating = host.spawn(WindowSpec::default());
        host.focus(floating);

        let (mut tiler, mut deferred) = (Tiler::new(), Scheduler::new());
        tiler.move_right(&at, &host, Some(a));
        tiler.run_queue(&mut at, &mut host, &mut deferred);
        assert_eq!(rect(&host, a), r(960, 0, 960, 1080));
        assert_eq!(rect(&host, b), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, floating), WindowSpec::default().rect);
        assert_eq!(deferred.take(), vec![Deferred::Activate(a)]);
    }

    #[test]
    fn moving_onto_a_cousin_reattaches_beside_it() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let (a, b, c) = three_windows(&mut at, &mut host);

        let (mut tiler, mut deferred) = (Tiler::new(), Scheduler::new());
        tiler.move_left(&at, &host, None);
        tiler.run_queue(&mut at, &mut host, &mut deferred);
        assert_eq!(rect(&host, a), r(0, 0, 960, 540));
        assert_eq!(rect(&host, c), r(0, 540, 960, 540));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
        assert_eq!(at.forest.attached(a), at.forest.attached(c));
    }

    #[test]
    fn moving_off_the_edge_goes_to_the_next_monitor() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let second = host.add_monitor(r(1920, 0, 1920, 1080));
        let a = open(&mut at, &mut host);

        let (mut tiler, mut deferred) = (Tiler::new(), Scheduler::new());
        tiler.move_right(&at, &host, None);
        tiler.run_queue(&mut at, &mut host, &mut deferred);
        assert_eq!(rect(&host, a), r(1920, 0, 1920, 1080));
        assert_eq!(host.workspace_id(a), Some(WorkspaceId::new(second, 0)));
        assert!(at.forest.find_toplevel(WorkspaceId::new(second, 0)).is_some());
        assert_eq!(at.forest.find_toplevel(WorkspaceId::default()), None);
    }

    #[test]
    fn move_queue_keeps_the_latest_two_requests() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        open(&mut at, &mut host);
        open(&mut at, &mut host);

        let mut tiler = Tiler::new();
        tiler.move_left(&at, &host, None);
        tiler.move_right(&at, &host, None);
        tiler.move_up(&at, &host, None);
        assert_eq!(tiler.pending_moves(), 2);

        tiler.exit();
        assert_eq!(tiler.pending_moves(), 0);
    }

    #[test]
    fn floating_windows_are_not_moved() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        open(&mut at, &mut host);
        let stray = host.spawn(WindowSpec::default());
        host.focus(stray);

        let mut tiler = Tiler::new();
        tiler.move_left(&at, &host, None);
        assert_eq!(tiler.pending_moves(), 0);
    }

    #[test]
    fn swap_mode_exchanges_with_the_selected_window() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);

        let (mut tiler, mut deferred) = (Tiler::new(), Scheduler::new());
        tiler.enter(&host);
        assert_eq!(tiler.window, Some(b));
        tiler.swap_left(&at, &host);
        assert_eq!(tiler.swap_window(), Some(a));

        tiler.accept(&mut at, &mut host, &mut deferred);
        assert_eq!(rect(&host, b), r(0, 0, 960, 1080));
        assert_eq!(rect(&host, a), r(960, 0, 960, 1080));
        assert_eq!(tiler.window, None);
        assert_eq!(deferred.take(), vec![Deferred::Activate(b)]);
    }

    #[test]
    fn leaving_swap_mode_changes_nothing() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        open(&mut at, &mut host);

        let mut tiler = Tiler::new();
        tiler.enter(&host);
        tiler.swap_left(&at, &host);
        tiler.exit();
        assert_eq!(tiler.swap_window(), None);
        assert_eq!(rect(&host, a), r(0, 0, 960, 1080));
    }
}

mod floating {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn settings() -> LayoutSettings {
        LayoutSettings {
            float_rules: vec![FloatRule { class: Some("^Gimp".parse().unwrap()), title: None }],
            ..Default::default()
        }
    }

    #[test]
    fn float_rules_match_by_class() {
        let (at, mut host) = (AutoTiler::default(), host_with(settings()));
        let gimp = host.spawn(WindowSpec { class: "Gimp-2.10".into(), ..Default::default() });
        let term = host.spawn(WindowSpec { class: "Alacritty".into(), ..Default::default() });
        assert!(at.should_float(&host, gimp));
        assert!(!at.should_float(&host, term));
    }

    #[test]
    fn toggling_a_rule_window_forces_it_into_the_tree_and_back_out() {
        let (mut at, mut host) = (AutoTiler::default(), host_with(settings()));
        let gimp = host.spawn(WindowSpec { class: "Gimp-2.10".into(), ..Default::default() });
        host.focus(gimp);
        let mut deferred = Scheduler::new();

        at.toggle_floating(&mut host, &mut deferred);
        assert!(at.forest.is_attached(gimp));
        assert!(host.contains_tag(gimp, Tags::FORCE_TILE));
        assert!(!at.should_float(&host, gimp));

        at.toggle_floating(&mut host, &mut deferred);
        assert!(!at.forest.is_attached(gimp));
        assert!(!host.contains_tag(gimp, Tags::FORCE_TILE));
    }

    #[test]
    fn toggling_a_tiled_window_floats_it() {
        let (mut at, mut host) = (AutoTiler::default(), host());
        let a = open(&mut at, &mut host);
        let b = open(&mut at, &mut host);
        let mut deferred = Scheduler::new();

        at.toggle_floating(&mut host, &mut deferred);
        assert!(!at.forest.is_attached(b));
        assert!(host.contains_tag(b, Tags::FLOATING));
        assert!(!host.is_tilable(b));
        assert_eq!(rect(&host, a), SCREEN);

        at.toggle_floating(&mut host, &mut deferred);
        assert!(at.forest.is_attached(b));
        assert_eq!(rect(&host, b), r(960, 0, 960, 1080));
    }
}
