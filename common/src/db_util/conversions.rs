//! Safe-ish conversions between rust and sql types.

use super::*;

pub fn i32_to_u32(i: i32) -> Result<u32> {
    u32::try_from(i).map_err(|_| anyhow!("i32 value {i} is negative and cannot be used as an id"))
}
pub fn u32_to_i32(i: u32) -> Result<i32> {
    i32::try_from(i).map_err(|_| anyhow!("u32 value {i} exceeds i32::MAX"))
}

pub fn i32_to_u8(i: i32) -> Result<u8> {
    u8::try_from(i).map_err(|_| anyhow!("i32 value {i} is out of range for u8"))
}
pub fn u8_to_i32(i: u8) -> i32 {
    i32::from(i)
}

pub fn ids_to_i32(ids: &[u32]) -> Result<Vec<i32>> {
    ids.iter().map(|id| u32_to_i32(*id)).collect()
}

pub fn deserialize_role(s: &str) -> Result<Role> {
    s.parse()
}
pub fn serialize_role(role: Role) -> String {
    role.as_str().to_string()
}

pub fn deserialize_vote_value(s: &str) -> Result<VoteValue> {
    s.parse()
}
pub fn serialize_vote_value(value: VoteValue) -> String {
    value.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_id_conversions_reject_out_of_range() {
        assert_eq!(i32_to_u32(7).unwrap(), 7);
        assert!(i32_to_u32(-1).is_err());
        assert!(u32_to_i32(u32::MAX).is_err());
        assert!(i32_to_u8(256).is_err());
        assert_eq!(u8_to_i32(5), 5);
    }

    #[test_log::test]
    fn test_vote_value_strings() {
        assert_eq!(serialize_vote_value(VoteValue::Down), "DOWN");
        assert_eq!(deserialize_vote_value("UP").unwrap(), VoteValue::Up);
        assert!(deserialize_vote_value("SIDEWAYS").is_err());
    }
}
