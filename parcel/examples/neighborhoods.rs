//! This example tags restaurants with the neighborhood they are in and measures neighborhood areas and distances to
//! a point of interest.
//!
//! Neighborhood polygons are written into an in-memory shapefile dataset and read back, the way they would be read
//! from files. If a directory is given as the first argument, the dataset files are also saved there.

use std::path::Path;

use parcel::feature::{AttributeTable, FeatureCollection, Field, Schema};
use parcel::geo::units::{AreaUnit, LengthUnit};
use parcel::geo::{Crs, NewGeoPoint};
use parcel::measurement::Measurement;
use parcel::overlay::Overlay;
use parcel::table::PointTableReader;
use parcel::{read_dataset, write_dataset, Dataset, MultiPolygon, ParcelError, Point2d, Polygon, Ring};

fn main() {
    env_logger::init();

    if let Err(err) = run(std::env::args().nth(1)) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(output: Option<String>) -> Result<(), ParcelError> {
    let dataset = write_dataset(&neighborhoods()?.into())?;
    if let Some(output) = output {
        save(&dataset, Path::new(&output))?;
    }

    let hoods = read_dataset(dataset.shp, dataset.dbf, Crs::WGS84)?;
    let hoods = hoods
        .as_polygons()
        .ok_or_else(|| ParcelError::MissingField("polygon geometry".into()))?;

    let restaurants = PointTableReader::new(Crs::WGS84)
        .with_text_column("id")
        .read(&include_bytes!("data/restaurants.csv")[..])?;

    let overlay = Overlay::new(hoods);
    let tagged = overlay.join(&restaurants, "name", "hood")?;

    let ferry_building = Point2d::latlon(37.7955, -122.3937);
    let tagged = Measurement::new()
        .with_distance_unit(LengthUnit::Mile)
        .with_distance_column(&tagged, &ferry_building, "ferry_mi")?;

    println!("{:<20} {:<14} {:>8}", "restaurant", "neighborhood", "miles");
    for (_, record) in tagged.iter() {
        let hood = record.get("hood").map(|v| v.to_string()).unwrap_or_default();
        println!(
            "{:<20} {:<14} {:>8.2}",
            record.get("name").map(|v| v.to_string()).unwrap_or_default(),
            if hood.is_empty() { "-".to_string() } else { hood },
            record.get("ferry_mi").and_then(|v| v.as_number()).unwrap_or(f64::NAN),
        );
    }

    let assignment = overlay.assign(&restaurants)?;
    let measured = Measurement::new()
        .with_area_unit(AreaUnit::SquareKilometer)
        .with_area_column(hoods, "area_km2")?;

    println!();
    println!("{:<14} {:>8} {:>12}", "neighborhood", "km²", "restaurants");
    for ((_, record), count) in measured.iter().zip(assignment.counts()) {
        println!(
            "{:<14} {:>8.3} {:>12}",
            record.get("name").map(|v| v.to_string()).unwrap_or_default(),
            record.get("area_km2").and_then(|v| v.as_number()).unwrap_or(f64::NAN),
            count
        );
    }

    Ok(())
}

fn save(dataset: &Dataset, dir: &Path) -> Result<(), ParcelError> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("neighborhoods.shp"), &dataset.shp)?;
    std::fs::write(dir.join("neighborhoods.shx"), &dataset.shx)?;
    std::fs::write(dir.join("neighborhoods.dbf"), &dataset.dbf)?;

    log::info!("Saved neighborhoods dataset to {}", dir.display());
    Ok(())
}

fn rect(west: f64, south: f64, east: f64, north: f64) -> Result<Ring, ParcelError> {
    Ok(Ring::closing(vec![
        Point2d::new(west, south),
        Point2d::new(east, south),
        Point2d::new(east, north),
        Point2d::new(west, north),
    ])?)
}

fn neighborhoods() -> Result<FeatureCollection<MultiPolygon>, ParcelError> {
    let mission = Polygon::new(
        rect(-122.4268, 37.7486, -122.4038, 37.7697)?,
        vec![rect(-122.4250, 37.7590, -122.4230, 37.7610)?],
    )?;
    let hayes_valley = Polygon::new(rect(-122.4330, 37.7700, -122.4180, 37.7800)?, vec![])?;
    let nob_hill = Polygon::new(rect(-122.4230, 37.7880, -122.4080, 37.7970)?, vec![])?;

    let schema = Schema::new(vec![Field::text("name")])?;
    let attributes = AttributeTable::with_rows(
        schema,
        [
            vec!["Mission".into()],
            vec!["Hayes Valley".into()],
            vec!["Nob Hill".into()],
        ],
    )?;

    Ok(FeatureCollection::new(
        Crs::WGS84,
        vec![mission.into(), hayes_valley.into(), nob_hill.into()],
        attributes,
    )?)
}
