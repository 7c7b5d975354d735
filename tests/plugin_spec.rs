use speculate2::speculate;

speculate! {
    use ghost_points::plugin::{ActionId, ActionOutcome, ActionRegistry, GhostPoints, PLUGIN_TITLE};
    use ghost_points::PluginConfig;
    use ghost_points_core::layer::{MapLayer, VectorLayer};
    use ghost_points_core::models::{AttributeValue, GeometryKind, NoticeKind};
    use ghost_points_core::{MemoryLayer, RecordingNotifier, HIDDEN_FIELD, HIDDEN_FILTER};

    fn setup_plugin() -> GhostPoints {
        GhostPoints::new(PluginConfig::from_dir("/tmp/ghost-points-plugin"))
    }

    fn point_layer() -> MemoryLayer {
        let mut layer = MemoryLayer::new("trees", GeometryKind::Point);
        for i in 0..3 {
            layer.add_feature(i as f64, 0.0);
        }
        layer
    }

    describe "toolbar" {
        it "registers both actions and removes them on unload" {
            let mut plugin = setup_plugin();
            let mut toolbar = ActionRegistry::default();

            plugin.init_gui(&mut toolbar);

            let titles: Vec<_> = toolbar.actions().iter().map(|a| a.title.as_str()).collect();
            assert_eq!(titles, vec!["Summon Ghost", "Banish Ghost"]);
            assert!(toolbar.actions()[0].icon.ends_with("ghost_icon.png"));
            assert!(toolbar.actions()[1].icon.ends_with("no_ghost_icon.png"));

            plugin.unload(&mut toolbar);
            assert!(toolbar.actions().is_empty());
        }
    }

    describe "summon ghost" {
        it "ghosts the layer's selection" {
            let mut plugin = setup_plugin();
            let mut layer = point_layer();
            layer.select([1, 3]);
            let mut ui = RecordingNotifier::default();

            let outcome = plugin.trigger(ActionId::SummonGhost, Some(&mut layer as &mut dyn MapLayer), &mut ui);

            assert_eq!(outcome, ActionOutcome::Hidden { ghosted: 2 });
            assert!(ui.notices.is_empty());
            assert_eq!(layer.value(3, HIDDEN_FIELD), Some(&AttributeValue::Integer(1)));
            assert_eq!(layer.subset_string(), HIDDEN_FILTER);
        }

        it "informs when nothing is selected" {
            let mut plugin = setup_plugin();
            let mut layer = point_layer();
            let mut ui = RecordingNotifier::default();

            let outcome = plugin.hide_selected_points(Some(&mut layer as &mut dyn MapLayer), &mut ui);

            assert_eq!(outcome, ActionOutcome::Reported { kind: NoticeKind::Information });
            assert!(!outcome.is_failure());
            let notice = ui.last().unwrap();
            assert_eq!(notice.title, PLUGIN_TITLE);
            assert_eq!(notice.message, "No features selected.");
            assert!(!layer.fields().contains(HIDDEN_FIELD));
        }

        it "warns without an active layer" {
            let mut plugin = setup_plugin();
            let mut ui = RecordingNotifier::default();

            let outcome = plugin.hide_selected_points(None, &mut ui);

            assert_eq!(outcome, ActionOutcome::Reported { kind: NoticeKind::Warning });
            assert_eq!(ui.last().unwrap().message, "Please select a valid point layer.");
        }

        it "warns on a polygon layer" {
            let mut plugin = setup_plugin();
            let mut layer = MemoryLayer::new("parcels", GeometryKind::Polygon);
            let id = layer.add_feature(0.0, 0.0);
            layer.select([id]);
            let mut ui = RecordingNotifier::default();

            let outcome = plugin.hide_selected_points(Some(&mut layer as &mut dyn MapLayer), &mut ui);

            assert!(outcome.is_failure());
            assert_eq!(ui.last().unwrap().kind, NoticeKind::Warning);
            assert_eq!(layer.schema_revision(), 0);
        }
    }

    describe "banish ghost" {
        it "asks before revealing" {
            let mut plugin = setup_plugin();
            let mut layer = point_layer();
            layer.select([2]);
            let mut ui = RecordingNotifier::answering(true);
            plugin.trigger(ActionId::SummonGhost, Some(&mut layer as &mut dyn MapLayer), &mut ui);

            let outcome = plugin.trigger(ActionId::BanishGhost, Some(&mut layer as &mut dyn MapLayer), &mut ui);

            assert_eq!(outcome, ActionOutcome::Revealed { count: 1 });
            assert_eq!(ui.questions.len(), 1);
            assert_eq!(layer.value(2, HIDDEN_FIELD), Some(&AttributeValue::Integer(0)));
            assert_eq!(layer.subset_string(), "");
            assert!(plugin.manager().ghosted().is_empty());
        }

        it "does nothing when declined" {
            let mut plugin = setup_plugin();
            let mut layer = point_layer();
            layer.select([2]);
            let mut ui = RecordingNotifier::answering(false);
            plugin.trigger(ActionId::SummonGhost, Some(&mut layer as &mut dyn MapLayer), &mut ui);

            let outcome = plugin.trigger(ActionId::BanishGhost, Some(&mut layer as &mut dyn MapLayer), &mut ui);

            assert_eq!(outcome, ActionOutcome::Cancelled);
            assert!(ui.notices.is_empty());
            assert_eq!(layer.subset_string(), HIDDEN_FILTER);
            assert!(plugin.manager().is_ghosted(2));
        }
    }
}
