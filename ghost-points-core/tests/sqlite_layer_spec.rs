use speculate2::speculate;

speculate! {
    use ghost_points_core::layer::VectorLayer;
    use ghost_points_core::models::{AttributeValue, GeometryKind};
    use ghost_points_core::{Database, GhostError, RecordingNotifier, VisibilityManager, HIDDEN_FIELD, HIDDEN_FILTER};
    use tempfile::TempDir;

    fn setup_db(dir: &TempDir) -> Database {
        let db = Database::open(dir.path().join("layers.db")).expect("Failed to open test database");
        db.migrate().expect("Failed to migrate");
        db
    }

    fn create_points(db: &Database, name: &str, n: usize) {
        db.create_layer(name, GeometryKind::Point).expect("Failed to create layer");
        for i in 0..n {
            db.add_feature(name, i as f64, -(i as f64)).expect("Failed to add feature");
        }
    }

    describe "ghosting on an sqlite layer" {
        it "persists the flag, filter and field across reopen" {
            let dir = TempDir::new().unwrap();
            {
                let db = setup_db(&dir);
                create_points(&db, "trees", 3);
                let mut layer = db.layer("trees").unwrap();
                let mut manager = VisibilityManager::new();

                layer.select([1, 3]).unwrap();
                let selection = layer.selected_feature_ids();
                manager.hide_selected(&mut layer, &selection).unwrap();

                assert_eq!(layer.visible_feature_ids().unwrap(), vec![2]);
            }

            let db = setup_db(&dir);
            let layer = db.layer("trees").unwrap();

            assert_eq!(layer.subset_string(), HIDDEN_FILTER);
            assert_eq!(layer.value(1, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Integer(1)));
            assert_eq!(layer.value(2, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Null));
            assert_eq!(layer.value(3, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Integer(1)));

            let fields = layer.fields();
            let field = fields.get(fields.lookup(HIDDEN_FIELD).unwrap()).unwrap();
            assert_eq!(field.comment.as_deref(), Some("Ghost points hidden status"));
        }

        it "reveals everything it ghosted" {
            let dir = TempDir::new().unwrap();
            let db = setup_db(&dir);
            create_points(&db, "trees", 3);
            let mut layer = db.layer("trees").unwrap();
            let mut manager = VisibilityManager::new();

            manager.hide_selected(&mut layer, &[1, 3]).unwrap();
            manager.hide_selected(&mut layer, &[2]).unwrap();
            assert!(layer.visible_feature_ids().unwrap().is_empty());

            let mut ui = RecordingNotifier::answering(true);
            manager.reveal_all(&mut layer, &mut ui).unwrap();

            assert_eq!(layer.visible_feature_ids().unwrap(), vec![1, 2, 3]);
            for id in 1..=3 {
                assert_eq!(layer.value(id, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Integer(0)));
            }
            assert_eq!(layer.subset_string(), "");
            assert!(!layer.is_editing());
        }

        it "restores a previous session's ghosts on request" {
            let dir = TempDir::new().unwrap();
            let db = setup_db(&dir);
            create_points(&db, "trees", 4);
            {
                let mut layer = db.layer("trees").unwrap();
                VisibilityManager::new().hide_selected(&mut layer, &[2, 4]).unwrap();
            }

            let mut layer = db.layer("trees").unwrap();
            let mut manager = VisibilityManager::new();
            assert_eq!(manager.restore_from_layer(&layer).unwrap(), 2);

            let mut ui = RecordingNotifier::answering(true);
            manager.reveal_all(&mut layer, &mut ui).unwrap();

            assert_eq!(layer.value(2, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Integer(0)));
            assert_eq!(layer.value(4, HIDDEN_FIELD).unwrap(), Some(AttributeValue::Integer(0)));
        }

        it "refuses polygon layers" {
            let dir = TempDir::new().unwrap();
            let db = setup_db(&dir);
            db.create_layer("parcels", GeometryKind::Polygon).unwrap();
            db.add_feature("parcels", 0.0, 0.0).unwrap();
            let mut layer = db.layer("parcels").unwrap();

            let err = VisibilityManager::new().hide_selected(&mut layer, &[1]).unwrap_err();

            assert!(matches!(err, GhostError::InvalidLayerSelection));
            assert!(!layer.fields().contains(HIDDEN_FIELD));
        }
    }
}
