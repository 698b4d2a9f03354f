use crate::errors::{TilescapeError, TilescapeResult};
use crate::terrain::coordinates::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What a tile edge accepts from the neighbour on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLabel {
    Grass,
    Road,
    Water,
    Wildcard,
}

impl EdgeLabel {
    /// Road and Water edges must meet the same label on the other side
    pub fn is_specialized(self) -> bool {
        matches!(self, EdgeLabel::Road | EdgeLabel::Water)
    }

    pub fn symbol(self) -> char {
        match self {
            EdgeLabel::Grass => 'G',
            EdgeLabel::Road => 'R',
            EdgeLabel::Water => 'W',
            EdgeLabel::Wildcard => '*',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'G' => Some(EdgeLabel::Grass),
            'R' => Some(EdgeLabel::Road),
            'W' => Some(EdgeLabel::Water),
            '*' => Some(EdgeLabel::Wildcard),
            _ => None,
        }
    }
}

/// Edge labels ordered (North, East, South, West)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionSignature(pub [EdgeLabel; 4]);

impl ConnectionSignature {
    pub const fn uniform(label: EdgeLabel) -> Self {
        Self([label; 4])
    }

    /// Parse a 4-character signature such as `"GRGR"`
    pub fn parse(symbols: &str) -> Option<Self> {
        let labels: Vec<EdgeLabel> = symbols
            .chars()
            .map(EdgeLabel::from_symbol)
            .collect::<Option<Vec<_>>>()?;
        let labels: [EdgeLabel; 4] = labels.try_into().ok()?;
        Some(Self(labels))
    }

    /// Rotate clockwise by `rotation` quarter turns: slot `i` takes base slot `i - rotation`
    pub fn rotated(&self, rotation: u8) -> Self {
        let k = (rotation % 4) as usize;
        let mut labels = self.0;
        labels.rotate_right(k);
        Self(labels)
    }

    pub fn edge(&self, direction: Direction) -> EdgeLabel {
        self.0[direction.index()]
    }

    pub fn contains(&self, label: EdgeLabel) -> bool {
        self.0.contains(&label)
    }
}

impl fmt::Display for ConnectionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in self.0 {
            write!(f, "{}", label.symbol())?;
        }
        Ok(())
    }
}

/// Feature family a tile or a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileFamily {
    Grass,
    Road,
    Water,
}

impl TileFamily {
    /// Edge label a path of this family stamps
    pub fn label(self) -> EdgeLabel {
        match self {
            TileFamily::Grass => EdgeLabel::Grass,
            TileFamily::Road => EdgeLabel::Road,
            TileFamily::Water => EdgeLabel::Water,
        }
    }

    /// Water wins over road so mixed water/road tiles stay with the water tiles
    pub fn of_signature(signature: &ConnectionSignature) -> Self {
        if signature.contains(EdgeLabel::Water) {
            TileFamily::Water
        } else if signature.contains(EdgeLabel::Road) {
            TileFamily::Road
        } else {
            TileFamily::Grass
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: String,
    /// Entries without a signature are kept but ignored by every search
    pub connections: Option<ConnectionSignature>,
    /// Decorative tiles get a random rotation when the grid is finalized
    #[serde(default)]
    pub decorative: bool,
}

impl TileDefinition {
    pub fn new(id: &str, connections: &str) -> Self {
        Self {
            id: id.to_string(),
            connections: ConnectionSignature::parse(connections),
            decorative: false,
        }
    }

    pub fn decorative(mut self) -> Self {
        self.decorative = true;
        self
    }
}

/// Catalog ids the generation stages stamp directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePalette {
    pub default_tile: String,
    pub water_full: String,
    pub shore_split: String,
    pub shore_corner: String,
    pub village: String,
    pub castle: String,
    pub mountain: String,
}

impl TilePalette {
    pub fn ids(&self) -> [&str; 7] {
        [
            &self.default_tile,
            &self.water_full,
            &self.shore_split,
            &self.shore_corner,
            &self.village,
            &self.castle,
            &self.mountain,
        ]
    }
}

impl Default for TilePalette {
    fn default() -> Self {
        Self {
            default_tile: "grass".to_string(),
            water_full: "water_full".to_string(),
            shore_split: "water_grass_split_LR".to_string(),
            shore_corner: "water_corner".to_string(),
            village: "grass_village".to_string(),
            castle: "grass_castle".to_string(),
            mountain: "grass_mountain".to_string(),
        }
    }
}

/// Ordered tile catalog; insertion order breaks ties in tile searches
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: Vec<TileDefinition>,
    index: HashMap<String, usize>,
    palette: TilePalette,
}

impl TileCatalog {
    /// Build a catalog, requiring the palette's default tile to be present
    pub fn from_entries(tiles: Vec<TileDefinition>, palette: TilePalette) -> TilescapeResult<Self> {
        let mut index = HashMap::new();
        for (i, tile) in tiles.iter().enumerate() {
            index.entry(tile.id.clone()).or_insert(i);
        }

        if !index.contains_key(&palette.default_tile) {
            return Err(TilescapeError::MissingPaletteTile {
                tile_id: palette.default_tile.clone(),
            });
        }

        Ok(Self {
            tiles,
            index,
            palette,
        })
    }

    pub fn palette(&self) -> &TilePalette {
        &self.palette
    }

    pub fn default_tile(&self) -> &str {
        &self.palette.default_tile
    }

    pub fn get(&self, id: &str) -> Option<&TileDefinition> {
        self.index.get(id).map(|&i| &self.tiles[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Base signature of a tile, `None` for unknown tiles or entries without one
    pub fn signature(&self, id: &str) -> Option<ConnectionSignature> {
        self.get(id).and_then(|tile| tile.connections)
    }

    /// Effective edge labels of a committed tile
    pub fn rotated_signature(&self, id: &str, rotation: u8) -> Option<ConnectionSignature> {
        self.signature(id).map(|sig| sig.rotated(rotation))
    }

    pub fn is_decorative(&self, id: &str) -> bool {
        self.get(id).is_some_and(|tile| tile.decorative)
    }

    /// Tiles that take part in connection searches, in catalog order
    pub fn connectable(&self) -> impl Iterator<Item = (&str, ConnectionSignature)> {
        self.tiles
            .iter()
            .filter_map(|tile| tile.connections.map(|sig| (tile.id.as_str(), sig)))
    }

    /// Candidate tiles for a feature family: the family's tiles plus the default tile.
    /// The grass family searches the whole catalog.
    pub fn candidates(&self, family: TileFamily) -> impl Iterator<Item = (&str, ConnectionSignature)> {
        let default_tile = self.palette.default_tile.as_str();
        self.connectable().filter(move |(id, sig)| match family {
            TileFamily::Grass => true,
            TileFamily::Water => sig.contains(EdgeLabel::Water) || *id == default_tile,
            TileFamily::Road => sig.contains(EdgeLabel::Road) || *id == default_tile,
        })
    }

    /// Family of a committed tile; unknown tiles count as grass
    pub fn family_of(&self, id: &str) -> TileFamily {
        self.signature(id)
            .map(|sig| TileFamily::of_signature(&sig))
            .unwrap_or(TileFamily::Grass)
    }

    /// First rotation of `id` whose edges satisfy `accept`
    pub fn find_rotation(&self, id: &str, accept: impl Fn(&ConnectionSignature) -> bool) -> Option<u8> {
        let base = self.signature(id)?;
        (0..4u8).find(|&rotation| accept(&base.rotated(rotation)))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tiles.iter().map(|tile| tile.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl Default for TileCatalog {
    /// The square tile set the placement front-end ships with
    fn default() -> Self {
        let tiles = vec![
            TileDefinition::new("grass", "GGGG"),
            TileDefinition::new("road_straight", "GRGR"),
            TileDefinition::new("road_corner", "RRGG"),
            TileDefinition::new("road_start", "RGGG"),
            TileDefinition::new("road_split", "RRRG"),
            TileDefinition::new("water_full", "WWWW"),
            TileDefinition::new("water_grass_split_LR", "GGGW"),
            TileDefinition::new("water_corner", "WWGG"),
            TileDefinition::new("water_road_straight", "WGRG"),
            TileDefinition::new("water_road_straight_harbour", "WGRG"),
            TileDefinition::new("grass_village", "GGGG").decorative(),
            TileDefinition::new("grass_castle", "GGGG").decorative(),
            TileDefinition::new("grass_mountain", "GGGG").decorative(),
            TileDefinition::new("any_square", "****"),
        ];

        let mut index = HashMap::new();
        for (i, tile) in tiles.iter().enumerate() {
            index.insert(tile.id.clone(), i);
        }

        Self {
            tiles,
            index,
            palette: TilePalette::default(),
        }
    }
}
