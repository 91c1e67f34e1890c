use crate::record::CsvRecord;
use serde::Serialize;
use serde_json::Value;

const REDACTED: &str = "********";

/// The user fields sent to the provisioning endpoint. The group name stays local.
#[derive(Debug, Serialize)]
struct UserFields<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    gender: &'a str,
    birth_date: &'a str,
    profile: &'a str,
    password: &'a str,
    source_member_id: &'a str,
    access_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
}

/// Body of `POST <base>/users`.
#[derive(Debug, Serialize)]
pub struct ProvisioningRequest<'a> {
    user: UserFields<'a>,
    client_id: &'a str,
    client_secret: &'a str,
}

impl<'a> ProvisioningRequest<'a> {
    /// Construct the request for a row with the integration credentials.
    pub fn new(record: &'a CsvRecord, client_id: &'a str, client_secret: &'a str) -> Self {
        let user = UserFields {
            first_name: &record.first_name,
            last_name: &record.last_name,
            email: &record.email,
            gender: &record.gender,
            birth_date: &record.birth_date,
            profile: &record.profile,
            password: &record.password,
            source_member_id: &record.user_id,
            access_code: &record.group_token,
            avatar: record.avatar(),
        };

        ProvisioningRequest {
            user,
            client_id,
            client_secret,
        }
    }

    /// JSON form of the request with the password and client secret masked.
    pub fn redacted(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        value["client_secret"] = Value::from(REDACTED);
        value["user"]["password"] = Value::from(REDACTED);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::ProvisioningRequest;
    use crate::record::tests::{record, USER_ID};
    use serde_json::json;

    #[test]
    fn serialize() {
        let rec = record(USER_ID);
        let request = ProvisioningRequest::new(&rec, "cid", "secret");
        let value = serde_json::to_value(&request).expect("Failed to serialize");

        assert_eq!(
            value,
            json!({
                "user": {
                    "first_name": "Jane",
                    "last_name": "Doe",
                    "email": "jane@x.com",
                    "gender": "F",
                    "birth_date": "2000-01-01",
                    "profile": "p",
                    "password": "pw",
                    "source_member_id": USER_ID,
                    "access_code": "tok1",
                },
                "client_id": "cid",
                "client_secret": "secret",
            })
        );
    }

    #[test]
    fn avatar_only_when_non_empty() {
        let mut rec = record(USER_ID);
        rec.avatar = Some(String::new());
        let value = serde_json::to_value(ProvisioningRequest::new(&rec, "cid", "secret"))
            .expect("Failed to serialize");
        assert!(value["user"].get("avatar").is_none());

        rec.avatar = Some("jane.png".to_owned());
        let value = serde_json::to_value(ProvisioningRequest::new(&rec, "cid", "secret"))
            .expect("Failed to serialize");
        assert_eq!(value["user"]["avatar"], "jane.png");
    }

    #[test]
    fn redacted() {
        let rec = record(USER_ID);
        let value = ProvisioningRequest::new(&rec, "cid", "secret").redacted();

        assert_eq!(value["client_id"], "cid");
        assert_eq!(value["client_secret"], "********");
        assert_eq!(value["user"]["password"], "********");
        assert_eq!(value["user"]["email"], "jane@x.com");
    }
}
