//! Immutable map geometry: roads, buildings, offices and the lookup tables
//! the movement tick uses to find which road a dog stands on.

use crate::error::GameError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Integer map coordinate.
pub type Coord = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: Coord,
    pub height: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub dx: Coord,
    pub dy: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Defines a string identifier newtype that serializes as a bare string and
/// can be looked up by `&str` in hash maps.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a map, unique across the game.
    MapId
);
string_id!(
    /// Identifier of an office, unique within its map.
    OfficeId
);

/// Axis-aligned road segment.
///
/// The end point is derived from the start point and a single end coordinate
/// on the road's own axis, so a road can never be diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoadRecord", into = "RoadRecord")]
pub struct Road {
    orientation: Orientation,
    start: Point,
    end: Point,
}

impl Road {
    pub fn new(orientation: Orientation, start: Point, end_coord: Coord) -> Self {
        let end = match orientation {
            Orientation::Horizontal => Point::new(end_coord, start.y),
            Orientation::Vertical => Point::new(start.x, end_coord),
        };
        Self {
            orientation,
            start,
            end,
        }
    }

    pub fn horizontal(start: Point, end_x: Coord) -> Self {
        Self::new(Orientation::Horizontal, start, end_x)
    }

    pub fn vertical(start: Point, end_y: Coord) -> Self {
        Self::new(Orientation::Vertical, start, end_y)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Lowest and highest coordinate covered on the road's own axis.
    /// Roads declared right-to-left or bottom-to-top are normalized here.
    pub fn span(&self) -> (Coord, Coord) {
        let (a, b) = match self.orientation {
            Orientation::Horizontal => (self.start.x, self.end.x),
            Orientation::Vertical => (self.start.y, self.end.y),
        };
        (a.min(b), a.max(b))
    }

    /// Every integer point the road occupies.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let (low, high) = self.span();
        (low..=high).map(move |c| match self.orientation {
            Orientation::Horizontal => Point::new(c, self.start.y),
            Orientation::Vertical => Point::new(self.start.x, c),
        })
    }
}

/// JSON shape of a road: `{x0, y0, x1}` for horizontal, `{x0, y0, y1}` for vertical.
#[derive(Serialize, Deserialize)]
struct RoadRecord {
    x0: Coord,
    y0: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x1: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y1: Option<Coord>,
}

impl TryFrom<RoadRecord> for Road {
    type Error = &'static str;

    fn try_from(record: RoadRecord) -> Result<Self, Self::Error> {
        let start = Point::new(record.x0, record.y0);
        match (record.x1, record.y1) {
            (Some(x1), None) => Ok(Road::horizontal(start, x1)),
            (None, Some(y1)) => Ok(Road::vertical(start, y1)),
            _ => Err("road must declare exactly one of `x1` or `y1`"),
        }
    }
}

impl From<Road> for RoadRecord {
    fn from(road: Road) -> Self {
        let (x1, y1) = match road.orientation {
            Orientation::Horizontal => (Some(road.end.x), None),
            Orientation::Vertical => (None, Some(road.end.y)),
        };
        Self {
            x0: road.start.x,
            y0: road.start.y,
            x1,
            y1,
        }
    }
}

/// Rectangular obstacle. Buildings are carried for clients; the movement
/// tick does not collide with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BuildingRecord", into = "BuildingRecord")]
pub struct Building {
    bounds: Rectangle,
}

impl Building {
    pub fn new(bounds: Rectangle) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &Rectangle {
        &self.bounds
    }
}

#[derive(Serialize, Deserialize)]
struct BuildingRecord {
    x: Coord,
    y: Coord,
    w: Coord,
    h: Coord,
}

impl From<BuildingRecord> for Building {
    fn from(record: BuildingRecord) -> Self {
        Building::new(Rectangle {
            position: Point::new(record.x, record.y),
            size: Size {
                width: record.w,
                height: record.h,
            },
        })
    }
}

impl From<Building> for BuildingRecord {
    fn from(building: Building) -> Self {
        let Rectangle { position, size } = *building.bounds();
        Self {
            x: position.x,
            y: position.y,
            w: size.width,
            h: size.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OfficeRecord", into = "OfficeRecord")]
pub struct Office {
    id: OfficeId,
    position: Point,
    offset: Offset,
}

impl Office {
    pub fn new(id: OfficeId, position: Point, offset: Offset) -> Self {
        Self {
            id,
            position,
            offset,
        }
    }

    pub fn id(&self) -> &OfficeId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficeRecord {
    id: OfficeId,
    x: Coord,
    y: Coord,
    offset_x: Coord,
    offset_y: Coord,
}

impl From<OfficeRecord> for Office {
    fn from(record: OfficeRecord) -> Self {
        Office::new(
            record.id,
            Point::new(record.x, record.y),
            Offset {
                dx: record.offset_x,
                dy: record.offset_y,
            },
        )
    }
}

impl From<Office> for OfficeRecord {
    fn from(office: Office) -> Self {
        let (position, offset) = (office.position(), office.offset());
        Self {
            id: office.id,
            x: position.x,
            y: position.y,
            offset_x: offset.dx,
            offset_y: offset.dy,
        }
    }
}

/// Point-to-road lookup, one table per axis. Values are indices into the
/// map's road list.
#[derive(Debug, Clone, Default)]
struct RoadIndex {
    horizontal: HashMap<Point, usize>,
    vertical: HashMap<Point, usize>,
}

impl RoadIndex {
    fn build(roads: &[Road]) -> Self {
        let mut index = Self::default();
        for (i, road) in roads.iter().enumerate() {
            let table = index.axis_mut(road.orientation());
            // Overlapping roads on one axis shadow each other: last one wins.
            for point in road.points() {
                table.insert(point, i);
            }
        }
        index
    }

    fn axis(&self, orientation: Orientation) -> &HashMap<Point, usize> {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    fn axis_mut(&mut self, orientation: Orientation) -> &mut HashMap<Point, usize> {
        match orientation {
            Orientation::Horizontal => &mut self.horizontal,
            Orientation::Vertical => &mut self.vertical,
        }
    }
}

/// Immutable map definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MapRecord", into = "MapRecord")]
pub struct Map {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    dog_speed: Option<f64>,
    road_index: RoadIndex,
}

impl Map {
    /// Builds a map and its point-to-road lookup.
    ///
    /// Fails with [`GameError::DuplicateOffice`] if two offices share an id.
    pub fn new(
        id: MapId,
        name: impl Into<String>,
        roads: Vec<Road>,
        buildings: Vec<Building>,
        offices: Vec<Office>,
    ) -> Result<Self, GameError> {
        let mut office_ids = HashSet::with_capacity(offices.len());
        for office in &offices {
            if !office_ids.insert(office.id()) {
                return Err(GameError::DuplicateOffice {
                    map: id,
                    office: office.id().clone(),
                });
            }
        }

        let road_index = RoadIndex::build(&roads);
        debug!(
            "Built map {} with {} roads ({} horizontal / {} vertical points indexed)",
            id,
            roads.len(),
            road_index.horizontal.len(),
            road_index.vertical.len()
        );

        Ok(Self {
            id,
            name: name.into(),
            roads,
            buildings,
            offices,
            dog_speed: None,
            road_index,
        })
    }

    /// Overrides the game-wide default dog speed for this map.
    pub fn with_dog_speed(mut self, speed: f64) -> Self {
        self.dog_speed = Some(speed);
        self
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    pub fn dog_speed(&self) -> Option<f64> {
        self.dog_speed
    }

    /// Road of the given orientation that covers `point`, if any.
    pub fn road_at(&self, orientation: Orientation, point: Point) -> Option<&Road> {
        self.road_index
            .axis(orientation)
            .get(&point)
            .map(|&i| &self.roads[i])
    }
}

/// JSON shape of a map. `dogSpeed` is read from configuration but never
/// written back out.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRecord {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    #[serde(default, skip_serializing)]
    dog_speed: Option<f64>,
}

impl TryFrom<MapRecord> for Map {
    type Error = GameError;

    fn try_from(record: MapRecord) -> Result<Self, Self::Error> {
        let map = Map::new(
            record.id,
            record.name,
            record.roads,
            record.buildings,
            record.offices,
        )?;
        Ok(match record.dog_speed {
            Some(speed) => map.with_dog_speed(speed),
            None => map,
        })
    }
}

impl From<Map> for MapRecord {
    fn from(map: Map) -> Self {
        Self {
            id: map.id,
            name: map.name,
            roads: map.roads,
            buildings: map.buildings,
            offices: map.offices,
            dog_speed: map.dog_speed,
        }
    }
}

/// Ordered, id-indexed collection of maps.
///
/// Maps are shared behind `Arc`, so cloning a catalog is cheap and hands out
/// a read-only view that needs no locking.
#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    maps: Vec<Arc<Map>>,
    index: HashMap<MapId, usize>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`GameError::DuplicateMap`] and leaves the catalog
    /// untouched if the id is already present.
    pub fn add(&mut self, map: Map) -> Result<(), GameError> {
        if self.index.contains_key(map.id()) {
            return Err(GameError::DuplicateMap(map.id().clone()));
        }
        self.index.insert(map.id().clone(), self.maps.len());
        self.maps.push(Arc::new(map));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Map>> {
        self.index.get(id).map(|&i| &self.maps[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Map>> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
