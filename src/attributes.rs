//! The fixed eight-dimensional attribute space.
//!
//! Every unit, strategy and army profile is an [`AttributeVector`]: one real
//! value per [`Attribute`], canonically in `[0, 1]`. Intermediate results may
//! leave that range; [`AttributeVector::clamped`] brings them back.

use std::fmt;
use std::ops::Index;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of dimensions in the attribute space.
pub const ATTRIBUTE_COUNT: usize = 8;

/// Wire keys, in dimension order.
pub const ATTRIBUTE_KEYS: [&str; ATTRIBUTE_COUNT] = [
    "U1_attack",
    "U2_defense",
    "U3_mobility",
    "U4_stealth",
    "U5_discipline",
    "U6_terrain_adapt",
    "U7_range_power",
    "U8_support",
];

/// One dimension of the attribute space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Offensive strength.
    #[serde(rename = "U1_attack")]
    Attack,
    /// Defensive strength.
    #[serde(rename = "U2_defense")]
    Defense,
    /// Speed of manoeuvre.
    #[serde(rename = "U3_mobility")]
    Mobility,
    /// Concealment.
    #[serde(rename = "U4_stealth")]
    Stealth,
    /// Cohesion under pressure.
    #[serde(rename = "U5_discipline")]
    Discipline,
    /// Adaptation to difficult ground.
    #[serde(rename = "U6_terrain_adapt")]
    TerrainAdapt,
    /// Ranged firepower.
    #[serde(rename = "U7_range_power")]
    RangePower,
    /// Logistics and support.
    #[serde(rename = "U8_support")]
    Support,
}

impl Attribute {
    /// All attributes in dimension order.
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::Attack,
        Attribute::Defense,
        Attribute::Mobility,
        Attribute::Stealth,
        Attribute::Discipline,
        Attribute::TerrainAdapt,
        Attribute::RangePower,
        Attribute::Support,
    ];

    /// Position of this attribute in a vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire key, e.g. `U1_attack`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        ATTRIBUTE_KEYS[self.index()]
    }

    /// Parse a wire key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A complete eight-dimensional attribute profile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttributeVector([f64; ATTRIBUTE_COUNT]);

impl AttributeVector {
    /// Create a vector from values in dimension order.
    #[must_use]
    pub const fn new(values: [f64; ATTRIBUTE_COUNT]) -> Self {
        Self(values)
    }

    /// Create a vector with every dimension set to `value`.
    #[must_use]
    pub const fn splat(value: f64) -> Self {
        Self([value; ATTRIBUTE_COUNT])
    }

    /// Value of one attribute.
    #[inline]
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> f64 {
        self.0[attribute.index()]
    }

    /// Overwrite one attribute.
    #[inline]
    pub fn set(&mut self, attribute: Attribute, value: f64) {
        self.0[attribute.index()] = value;
    }

    /// Raw values in dimension order.
    #[must_use]
    pub const fn values(&self) -> &[f64; ATTRIBUTE_COUNT] {
        &self.0
    }

    /// Iterate `(attribute, value)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// Multiply a single attribute by `factor`.
    #[must_use]
    pub fn scale_attribute(mut self, attribute: Attribute, factor: f64) -> Self {
        self.0[attribute.index()] *= factor;
        self
    }

    /// Multiply every attribute by `factor`.
    #[must_use]
    pub fn scale(mut self, factor: f64) -> Self {
        for v in &mut self.0 {
            *v *= factor;
        }
        self
    }

    /// Clamp every attribute to `[0, 1]`.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for v in &mut self.0 {
            *v = v.clamp(0.0, 1.0);
        }
        self
    }

    /// Whether every attribute lies in `[0, 1]`.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.0.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let mut out = *self;
        for (v, o) in out.0.iter_mut().zip(other.0) {
            *v -= o;
        }
        out
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.subtract(other).norm()
    }

    /// Arithmetic mean of a sequence of vectors, `None` if it is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean<'a, I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AttributeVector>,
    {
        let mut sum = [0.0; ATTRIBUTE_COUNT];
        let mut count = 0usize;
        for vector in vectors {
            for (s, v) in sum.iter_mut().zip(vector.0) {
                *s += v;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self(sum.map(|s| s / n)))
    }
}

impl Index<Attribute> for AttributeVector {
    type Output = f64;

    fn index(&self, attribute: Attribute) -> &f64 {
        &self.0[attribute.index()]
    }
}

impl From<[f64; ATTRIBUTE_COUNT]> for AttributeVector {
    fn from(values: [f64; ATTRIBUTE_COUNT]) -> Self {
        Self(values)
    }
}

impl Serialize for AttributeVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ATTRIBUTE_COUNT))?;
        for (attribute, value) in self.iter() {
            map.serialize_entry(attribute.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeVectorVisitor)
    }
}

struct AttributeVectorVisitor;

impl<'de> Visitor<'de> for AttributeVectorVisitor {
    type Value = AttributeVector;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map with all {ATTRIBUTE_COUNT} attribute keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut slots: [Option<f64>; ATTRIBUTE_COUNT] = [None; ATTRIBUTE_COUNT];
        while let Some(key) = map.next_key::<String>()? {
            let attribute = Attribute::from_key(&key)
                .ok_or_else(|| de::Error::unknown_field(&key, &ATTRIBUTE_KEYS))?;
            let slot = &mut slots[attribute.index()];
            if slot.is_some() {
                return Err(de::Error::duplicate_field(attribute.key()));
            }
            *slot = Some(map.next_value()?);
        }

        let mut values = [0.0; ATTRIBUTE_COUNT];
        for (attribute, slot) in Attribute::ALL.into_iter().zip(slots) {
            values[attribute.index()] =
                slot.ok_or_else(|| de::Error::missing_field(attribute.key()))?;
        }
        Ok(AttributeVector(values))
    }
}
