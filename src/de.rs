use std::fmt::Display;
use std::slice;
use std::str::FromStr;

use serde::de::{
    self, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde::Deserialize;

use crate::document::Section;
use crate::error::{Error, ErrorKind, Result};

/// Project a section onto a type that implements `Deserialize`.
///
/// Struct fields are matched with property names. A scalar field takes
/// exactly one value, a `Vec` field takes all of them, an `Option` field
/// is `None` if the property is absent.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Db {
///     host: String,
///     port: u16,
///     #[serde(default)]
///     replica: Vec<String>,
/// }
///
/// let config = rawini::from_str("[db]\nhost=localhost\nport=5432\nreplica=a\nreplica=b")?;
/// let db: Db = rawini::from_section(config.section("db").unwrap())?;
/// assert_eq!(db.port, 5432);
/// assert_eq!(db.replica, ["a", "b"]);
/// # Ok::<(), rawini::Error>(())
/// ```
pub fn from_section<T>(section: &Section) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(SectionDeserializer { section })
}

struct SectionDeserializer<'a> {
    section: &'a Section,
}

impl<'de> Deserializer<'de> for SectionDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(SectionAccess {
            iter: Box::new(self.section.iter()),
            value: None,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

// Walks the properties of a section.
struct SectionAccess<'a> {
    iter: Box<dyn Iterator<Item = (&'a str, &'a [String])> + 'a>,
    value: Option<(&'a str, &'a [String])>,
}

impl<'de> MapAccess<'de> for SectionAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((property, values)) => {
                trace!("SectionAccess::next_key_seed {}", property);
                self.value = Some((property, values));
                let de = property.into_deserializer();
                seed.deserialize(de).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let (property, values) = self
            .value
            .take()
            .ok_or_else(|| <Error as de::Error>::custom("value requested before key"))?;
        seed.deserialize(ValueDeserializer { property, values })
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

// The values of one property.
struct ValueDeserializer<'a> {
    property: &'a str,
    values: &'a [String],
}

impl<'a> ValueDeserializer<'a> {
    fn single(&self) -> Result<&'a str> {
        match self.values {
            [value] => Ok(value.as_str()),
            [] => Err(Error::conversion(self.property, "no value".to_string())),
            _ => Err(Error::decode(ErrorKind::RepeatedUniqueProperty(
                self.property.to_string(),
            ))),
        }
    }

    fn parse<T>(&self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.single()?;
        value
            .parse()
            .map_err(|e| Error::conversion(self.property, format!("expected {}: {}", what, e)))
    }
}

// The next methods only differ in the type they parse.
macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($what:expr);)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.parse($what)?)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.values.len() == 1 {
            self.deserialize_str(visitor)
        } else {
            self.deserialize_seq(visitor)
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let v = match self.single()? {
            "y" | "yes" | "t" | "true" | "on" | "1" => true,
            "n" | "no" | "f" | "false" | "off" | "0" => false,
            _ => return Err(Error::conversion(self.property, "expected boolean".to_string())),
        };
        visitor.visit_bool(v)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8("i8 integer");
        deserialize_i16 => visit_i16("i16 integer");
        deserialize_i32 => visit_i32("i32 integer");
        deserialize_i64 => visit_i64("i64 integer");
        deserialize_i128 => visit_i128("i128 integer");
        deserialize_u8 => visit_u8("u8 integer");
        deserialize_u16 => visit_u16("u16 integer");
        deserialize_u32 => visit_u32("u32 integer");
        deserialize_u64 => visit_u64("u64 integer");
        deserialize_u128 => visit_u128("u128 integer");
        deserialize_f32 => visit_f32("f32 float");
        deserialize_f64 => visit_f64("f64 float");
        deserialize_char => visit_char("single character");
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.single()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.single()?.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    // A property that is present always has at least one value; absent
    // ones never get here, serde fills in `None` for them.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.values.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ValuesAccess {
            property: self.property,
            iter: self.values.iter(),
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::conversion(
            self.property,
            "nested tables are not supported".to_string(),
        ))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    // Only unit variants: the value names the variant.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.single()?;
        visitor.visit_enum(value.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

// Each value of a multi-valued property.
struct ValuesAccess<'a> {
    property: &'a str,
    iter: slice::Iter<'a, String>,
}

impl<'de> SeqAccess<'de> for ValuesAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer {
                    property: self.property,
                    values: slice::from_ref(value),
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
