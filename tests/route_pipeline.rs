use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wastewise::calibration::{CalibrationModel, load_calibration_from_path};
use wastewise::error::AppError;
use wastewise::service::WasteService;
use wastewise::store::{BinStore, MemoryStore};
use wastewise::{config, seed};

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_768_134_720 + secs)
}

fn seeded_service(
    store: Arc<MemoryStore>,
) -> Result<(WasteService, usize), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    let calibration = match config.calibration_path() {
        Some(path) => load_calibration_from_path(path)?,
        None => CalibrationModel::default(),
    };
    let inserted = seed::seed_bins(store.as_ref(), config.seed_bins(), &calibration, at(0))?;
    let service = WasteService::new(store, calibration, config.route_options());
    Ok((service, inserted))
}

#[test]
fn seeded_campus_produces_expected_route() -> Result<(), Box<dyn std::error::Error>> {
    let (service, inserted) = seeded_service(Arc::new(MemoryStore::new()))?;
    assert_eq!(inserted, 6);

    let plan = service.compute_route("bin-04", "bin-06", at(0))?;

    assert_eq!(
        plan.bin_ids(),
        vec!["bin-04", "bin-03", "bin-02", "bin-01", "bin-06"]
    );
    assert_eq!(plan.polyline.len(), plan.stops.len());
    for (index, stop) in plan.stops.iter().enumerate() {
        assert_eq!(stop.order, index);
        assert_eq!(plan.polyline[index], stop.location);
    }
    Ok(())
}

#[test]
fn telemetry_then_emptied_changes_route_and_heatmap() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let (service, _) = seeded_service(Arc::clone(&store))?;

    // Turlington fills up: 10 cm is the calibrated full distance.
    service.ingest_telemetry("bin-05", 10.0, Some(100.0), at(60))?;
    let plan = service.compute_route("bin-04", "bin-06", at(120))?;
    assert!(plan.bin_ids().contains(&"bin-05"));

    let heat = service.compute_heatmap(10, at(120))?;
    let turlington = heat
        .iter()
        .find(|point| point.location.lat == 29.6489)
        .ok_or(AppError::BinNotFound("bin-05".to_string()))?;
    assert_eq!(turlington.weight, 1.0);

    let emptied = service.mark_emptied("bin-05", at(180))?;
    assert_eq!(emptied.fill_percent, 0.0);
    let plan = service.compute_route("bin-04", "bin-06", at(240))?;
    assert!(!plan.bin_ids().contains(&"bin-05"));

    assert_eq!(store.sample_count()?, 1);
    Ok(())
}

#[test]
fn reseeding_keeps_live_readings() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let (service, _) = seeded_service(Arc::clone(&store))?;
    service.ingest_telemetry("bin-01", 35.0, None, at(30))?;

    let (_, inserted_again) = seeded_service(Arc::clone(&store))?;

    assert_eq!(inserted_again, 0);
    let bin = store.fetch_bin("bin-01")?.ok_or(AppError::BinNotFound("bin-01".to_string()))?;
    assert_eq!(bin.fill_percent, 50.0);
    assert_eq!(bin.name, "Marston Library");
    Ok(())
}

#[test]
fn unknown_endpoints_are_reported_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let (service, _) = seeded_service(Arc::new(MemoryStore::new()))?;

    assert_eq!(
        service.compute_route("missing", "also-missing", at(0)),
        Err(AppError::StartNotFound("missing".to_string()))
    );
    assert_eq!(
        service.compute_route("bin-01", "also-missing", at(0)),
        Err(AppError::EndNotFound("also-missing".to_string()))
    );
    Ok(())
}
