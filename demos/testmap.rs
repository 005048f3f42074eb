//! Generate a walled port city on a coastline split by a river
//!
//! Run with `RUST_LOG=debug` to see every skipped gate and dropped road.

use rust_voronoi_city::*;
use tracing_subscriber::EnvFilter;

const SMALL: u32 = 1;
const MEDIUM: u32 = 2;
const LARGE: u32 = 3;
const TINY: u32 = 4;
const HUGE: u32 = 5;
const GIANT: u32 = 6;

fn footprint(id: u32) -> FootprintConfig {
    match id {
        SMALL => FootprintConfig::new(SMALL, 8, 8, 0.2),
        MEDIUM => FootprintConfig::new(MEDIUM, 9, 9, 0.1),
        LARGE => FootprintConfig::new(LARGE, 12, 12, 0.05),
        TINY => FootprintConfig::new(TINY, 5, 5, 0.5),
        HUGE => FootprintConfig::new(HUGE, 16, 16, 0.3),
        _ => FootprintConfig::new(GIANT, 30, 30, 0.2),
    }
}

fn catalog() -> DistrictCatalog {
    use DistrictType::*;

    let base = DistrictConfig {
        footprints: [SMALL, MEDIUM, LARGE].map(footprint).to_vec(),
        ..Default::default()
    };
    let mut catalog = DistrictCatalog::uniform(base);

    let mut set = |t: DistrictType, change: &dyn Fn(&mut DistrictConfig)| {
        if let Some(config) = catalog.get_mut(t) {
            change(config);
        }
    };

    for t in [ResidentialSlum, Abandoned, ResidentialMiddle, Docks] {
        set(t, &|c| c.footprints.push(footprint(TINY)));
    }
    set(Graveyard, &|c| c.footprints = vec![footprint(TINY)]);
    for t in [Empty, Park, Square, Market] {
        set(t, &|c| c.footprints.clear());
    }
    set(Fields, &|c| c.footprints = vec![footprint(GIANT), footprint(HUGE)]);
    for t in [ResidentialUpper, Civic, Fortress, Temple] {
        set(t, &|c| c.footprints.extend([footprint(GIANT), footprint(HUGE)]));
    }

    set(Fortress, &|c| {
        c.has_curtain_fortifications = true;
        c.central = Some(footprint(HUGE));
        c.max_in_city = 1;
        c.road_density = 0.2;
    });
    set(Civic, &|c| {
        c.central = Some(footprint(HUGE));
        (c.min_in_city, c.max_in_city) = (1, 1);
        (c.road_width, c.road_density, c.building_density) = (3, 0.7, 0.8);
    });
    set(Temple, &|c| {
        c.central = Some(footprint(HUGE));
        (c.min_in_city, c.max_in_city) = (1, 1);
        (c.road_density, c.building_density) = (0.7, 0.8);
    });
    set(Square, &|c| {
        c.central = Some(footprint(SMALL));
        (c.min_in_city, c.max_in_city) = (1, 1);
        c.road_density = 0.2;
    });
    set(Market, &|c| {
        (c.min_in_city, c.max_in_city) = (1, 1);
        c.road_density = 0.4;
    });
    set(Park, &|c| {
        (c.min_in_city, c.max_in_city) = (1, 1);
        c.road_density = 0.0;
    });
    set(Graveyard, &|c| (c.min_in_city, c.max_in_city) = (1, 3));
    set(Industrial, &|c| c.max_in_city = 5);
    set(Research, &|c| {
        c.max_in_city = 1;
        (c.probability, c.building_density) = (0.01, 0.7);
    });
    set(Prison, &|c| (c.max_in_city, c.probability) = (1, 0.01));
    set(Barracks, &|c| (c.max_in_city, c.probability) = (4, 0.03));
    set(Abandoned, &|c| {
        c.max_in_city = 1;
        (c.road_width, c.road_density) = (1, 1.2);
    });
    set(Docks, &|c| c.max_in_city = 2);
    set(Fields, &|c| (c.probability, c.road_width, c.road_density) = (0.3, 2, 0.1));
    set(ResidentialSlum, &|c| (c.probability, c.road_width, c.road_density) = (0.1, 1, 1.0));
    set(ResidentialLower, &|c| c.probability = 0.4);
    set(ResidentialMiddle, &|c| {
        (c.probability, c.road_density, c.building_density) = (0.2, 0.7, 0.9);
    });
    set(ResidentialUpper, &|c| {
        (c.probability, c.road_width, c.road_density, c.building_density) = (0.01, 3, 0.3, 0.7);
    });
    set(Warehouse, &|c| c.road_density = 0.5);
    set(Empty, &|c| (c.probability, c.road_density) = (0.1, 0.0));

    catalog
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== rust_voronoi_city test map ===\n");

    let outline = BandOutline::new(50).with_river(495, 505);
    let config = CityConfigBuilder::new()
        .seed(std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(1))
        .main_road_width(4)
        .bridge_length(10, 15)?
        .desired_districts(100)
        .min_district_size(150)?
        .min_dock_size(10)
        .fortifications(FortificationSettings::default())?
        .build()?;
    println!("Seed: {}", config.seed);

    let city = City::generate(&catalog(), config, &outline)?;

    println!("\nDistricts: {}", city.districts().len());
    for (t, count) in &city.stats().districts_by_type {
        println!("  {:<24} {}", t, count);
    }

    let buildings: usize = city
        .districts()
        .iter()
        .map(|d| d.buildings.len() + usize::from(d.central.is_some()))
        .sum();
    let minor_roads: usize = city.districts().iter().map(|d| d.roads.len()).sum();
    println!("\nMain roads: {} ({} bridges)", city.roads().len(), city.stats().bridges);
    println!("Minor roads: {}", minor_roads);
    println!("Wall sections: {}", city.walls().len());
    println!("Towers: {}", city.towers().len());
    println!("Gates: {}", city.gates().len());
    println!("Buildings: {}", buildings);

    for d in city.districts().iter().filter(|d| d.has_curtain_fortifications) {
        println!(
            "\nCurtain wall around {} {}: {} sections, {} towers, {} gate(s)",
            d.district_type,
            d.id,
            d.walls.len(),
            d.towers.len(),
            d.gates.len()
        );
    }

    println!("\n=== Done ===");
    Ok(())
}
