use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_std::{fmt, io, marker::PhantomData, string::ToString, vec, vec::Vec};
use serde::{
    de::{SeqAccess, Visitor},
    Deserializer, Serialize, Serializer,
};
use serde_with::{DeserializeAs, SerializeAs};

/// serde adapter that encodes any ark object through its canonical compressed bytes.
/// Used as `#[serde_as(as = "ArkObjectBytes")]` on fields holding field or group elements.
pub struct ArkObjectBytes;

impl<T: CanonicalSerialize> SerializeAs<T> for ArkObjectBytes {
    fn serialize_as<S>(elem: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut bytes = vec![];
        elem.serialize_compressed(&mut bytes)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_bytes(&bytes)
    }
}

impl<'de, T: CanonicalDeserialize> DeserializeAs<'de, T> for ArkObjectBytes {
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjVisitor<T: CanonicalDeserialize>(PhantomData<T>);

        impl<'a, T: CanonicalDeserialize> Visitor<'a> for ObjVisitor<T> {
            type Value = T;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("expected canonically serialized object")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'a>,
            {
                let mut bytes: Vec<u8> = Vec::with_capacity(seq.size_hint().unwrap_or(48));
                while let Some(b) = seq.next_element()? {
                    bytes.push(b);
                }
                T::deserialize_compressed(bytes.as_slice()).map_err(serde::de::Error::custom)
            }
        }
        deserializer.deserialize_seq(ObjVisitor::<T>(PhantomData))
    }
}

/// serde shim so error enums holding `ark_serialize::SerializationError` can derive `Serialize`
#[derive(Serialize)]
#[serde(remote = "SerializationError")]
pub enum ArkSerializationError {
    NotEnoughSpace,
    InvalidData,
    UnexpectedFlags,
    #[serde(serialize_with = "io_error_string")]
    IoError(io::Error),
}

fn io_error_string<S>(error: &io::Error, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&error.to_string())
}
