use idm_core::{
    list::{sort_domains, SortColumn, SortDirection},
    DomainType, ListDomainsResponse,
};

const LIST_PAGE: &str = r#"{
  "meta": { "count": 12, "offset": 0, "limit": 10 },
  "links": { "first": "/api/idmsvc/v1/domains?limit=10&offset=0", "next": "/api/idmsvc/v1/domains?limit=10&offset=10" },
  "data": [
    {
      "domain_id": "2c7a0e5e-6a39-4c5f-9f7e-1a5a3c8b9d10",
      "domain_name": "lab.example.test",
      "title": "Lab",
      "domain_type": "rhel-idm",
      "auto_enrollment_enabled": false
    },
    {
      "domain_id": "8f2b3c1d-0e4f-4a5b-8c6d-7e8f9a0b1c2d",
      "domain_name": "corp.example.test",
      "title": "Corporate",
      "description": "Main realm",
      "domain_type": "rhel-idm",
      "auto_enrollment_enabled": true,
      "rhel-idm": {
        "realm_name": "CORP.EXAMPLE.TEST",
        "realm_domains": ["corp.example.test"],
        "ca_certs": [{
          "nickname": "CORP.EXAMPLE.TEST IPA CA",
          "issuer": "CN=Certificate Authority,O=CORP.EXAMPLE.TEST",
          "subject": "CN=Certificate Authority,O=CORP.EXAMPLE.TEST",
          "serial_number": "1",
          "not_before": "2023-01-01T00:00:00Z",
          "not_after": "2043-01-01T00:00:00Z",
          "pem": "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----"
        }],
        "servers": [
          {"fqdn": "ipa1.corp.example.test", "ca_server": true, "hcc_enrollment_server": true, "hcc_update_server": true, "pkinit_server": true, "ipa_version": "4.10.1", "location": "prague"},
          {"fqdn": "ipa2.corp.example.test", "ca_server": false, "hcc_enrollment_server": true, "hcc_update_server": false, "pkinit_server": true}
        ],
        "locations": [{"name": "prague"}]
      }
    }
  ]
}"#;

#[test]
fn list_page_parses_and_sorts() {
    let mut page: ListDomainsResponse = serde_json::from_str(LIST_PAGE).unwrap();
    assert_eq!(page.meta.count, 12);
    assert_eq!(page.data.len(), 2);
    assert!(page.links.next.is_some());

    let corp = &page.data[1];
    assert_eq!(corp.domain_type, DomainType::RhelIdm);
    assert_eq!(corp.server_count(), 2);
    let ipa = corp.rhel_idm.as_ref().unwrap();
    assert_eq!(ipa.ca_certs[0].serial_number, "1");
    assert_eq!(ipa.servers[0].location.as_deref(), Some("prague"));

    sort_domains(&mut page.data, SortColumn::Name, SortDirection::Asc);
    assert_eq!(page.data[0].title_or_empty(), "Corporate");
    sort_domains(&mut page.data, SortColumn::AutoJoin, SortDirection::Desc);
    assert_eq!(page.data[0].title_or_empty(), "Corporate");
}
