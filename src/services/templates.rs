/// Mensagens das conversas criadas no FreeScout
///
/// Dois pares assunto/corpo: vulnerabilidade e política com falha. O corpo é
/// markdown (o FreeScout renderiza). Metadados opcionais ausentes não geram
/// parágrafo, e a lista de hosts é cortada nos primeiros 50.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::models::{HostVulnerabilitySummary, PolicySetHost};
use crate::utils::{AppError, AppResult};

pub const NVD_CVE_URL: &str = "https://nvd.nist.gov/vuln/detail/";

/// Máximo de hosts listados no corpo, independente do total afetado
pub const MAX_HOSTS_IN_BODY: usize = 50;

const FOOTER: &str = "----\n\nThis conversation was created automatically by your Fleet FreeScout integration.\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub summary: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct VulnMessage<'a> {
    pub fleet_url: &'a str,
    pub cve: &'a str,
    pub hosts: &'a [HostVulnerabilitySummary],
    pub epss_probability: Option<f64>,
    pub cvss_score: Option<f64>,
    pub cisa_known_exploit: Option<bool>,
    pub cve_published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct FailingPolicyMessage<'a> {
    pub fleet_url: &'a str,
    pub policy_id: u64,
    pub policy_name: &'a str,
    pub policy_critical: bool,
    pub team_id: Option<u64>,
    pub hosts: &'a [PolicySetHost],
}

impl VulnMessage<'_> {
    pub fn summary(&self) -> String {
        format!("Vulnerability {} detected on {} host(s)", self.cve, self.hosts.len())
    }

    pub fn body(&self) -> AppResult<String> {
        let fleet_url = fleet_base(self.fleet_url)?;
        let mut out = String::new();

        writeln!(
            out,
            "See vulnerability (CVE) details in National Vulnerability Database (NVD) here: [{cve}]({nvd}{cve}).\n",
            cve = self.cve,
            nvd = NVD_CVE_URL
        )
        .map_err(template_err)?;

        if let Some(epss) = self.epss_probability {
            writeln!(
                out,
                "Probability of exploit (reported by [FIRST.org/epss](https://www.first.org/epss/)): {}\n",
                epss
            )
            .map_err(template_err)?;
        }
        if let Some(cvss) = self.cvss_score {
            writeln!(out, "CVSS score (reported by [NVD](https://nvd.nist.gov/)): {}\n", cvss).map_err(template_err)?;
        }
        if let Some(published) = self.cve_published {
            writeln!(
                out,
                "Published (reported by [NVD](https://nvd.nist.gov/)): {}\n",
                published.format("%Y-%m-%d %H:%M:%S %z UTC")
            )
            .map_err(template_err)?;
        }
        if let Some(known) = self.cisa_known_exploit {
            writeln!(
                out,
                "Known exploits (reported by [CISA](https://www.cisa.gov/known-exploited-vulnerabilities-catalog)): {}\n",
                if known { "Yes" } else { "No" }
            )
            .map_err(template_err)?;
        }

        out.push_str("Affected hosts:\n\n");
        for host in self.hosts.iter().take(MAX_HOSTS_IN_BODY) {
            writeln!(out, "* [{}]({}/hosts/{})", host.display_name, fleet_url, host.id).map_err(template_err)?;
            for path in host.software_installed_paths.iter().filter(|p| !p.is_empty()) {
                writeln!(out, "    * {}", path).map_err(template_err)?;
            }
        }

        write!(
            out,
            "\nView the affected software and more affected hosts:\n\n\
             1. Go to the [Software]({fleet}/software/manage) page in Fleet.\n\
             2. Above the list of software, in the **Search software** box, enter \"{cve}\".\n\
             3. Hover over the affected software and select **View all hosts**.\n\n",
            fleet = fleet_url,
            cve = self.cve
        )
        .map_err(template_err)?;
        out.push_str(FOOTER);

        Ok(out)
    }

    pub fn render(&self) -> AppResult<RenderedMessage> {
        Ok(RenderedMessage {
            summary: self.summary(),
            body: self.body()?,
        })
    }
}

impl FailingPolicyMessage<'_> {
    pub fn summary(&self) -> String {
        format!("{} policy failed on {} host(s)", self.policy_name, self.hosts.len())
    }

    pub fn body(&self) -> AppResult<String> {
        let fleet_url = fleet_base(self.fleet_url)?;
        let mut out = String::new();

        if self.policy_critical {
            out.push_str("This policy is marked as **Critical** in Fleet.\n\n");
        }

        out.push_str("Hosts:\n\n");
        for host in self.hosts.iter().take(MAX_HOSTS_IN_BODY) {
            writeln!(out, "* [{}]({}/hosts/{})", host.display_name, fleet_url, host.id).map_err(template_err)?;
        }

        let team_param = self
            .team_id
            .map(|id| format!("team_id={}&", id))
            .unwrap_or_default();
        write!(
            out,
            "\nView hosts that failed {name} on the [**Hosts**]({fleet}/hosts/manage/?order_key=hostname&order_direction=asc&{team}policy_id={id}&policy_response=failing) page in Fleet.\n\n",
            name = self.policy_name,
            fleet = fleet_url,
            team = team_param,
            id = self.policy_id
        )
        .map_err(template_err)?;
        out.push_str(FOOTER);

        Ok(out)
    }

    pub fn render(&self) -> AppResult<RenderedMessage> {
        Ok(RenderedMessage {
            summary: self.summary(),
            body: self.body()?,
        })
    }
}

fn fleet_base(url: &str) -> AppResult<&str> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::TemplateError("missing Fleet server URL".to_string()));
    }
    Ok(trimmed)
}

fn template_err(e: std::fmt::Error) -> AppError {
    AppError::TemplateError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vuln_hosts(n: u64) -> Vec<HostVulnerabilitySummary> {
        (1..=n)
            .map(|id| HostVulnerabilitySummary {
                id,
                hostname: format!("host-{}", id),
                display_name: format!("Host {}", id),
                software_installed_paths: Vec::new(),
            })
            .collect()
    }

    fn vuln_message<'a>(hosts: &'a [HostVulnerabilitySummary]) -> VulnMessage<'a> {
        VulnMessage {
            fleet_url: "https://fleet.example.com/",
            cve: "CVE-2024-0001",
            hosts,
            epss_probability: None,
            cvss_score: None,
            cisa_known_exploit: None,
            cve_published: None,
        }
    }

    #[test]
    fn test_vuln_summary_counts_all_hosts_body_lists_first_50() {
        let hosts = vuln_hosts(60);
        let rendered = vuln_message(&hosts).render().unwrap();

        assert_eq!(rendered.summary, "Vulnerability CVE-2024-0001 detected on 60 host(s)");
        assert_eq!(rendered.body.matches("* [Host ").count(), 50);
        assert!(rendered.body.contains("* [Host 50](https://fleet.example.com/hosts/50)"));
        assert!(!rendered.body.contains("[Host 51]"));
    }

    #[test]
    fn test_vuln_body_without_metadata_omits_optional_paragraphs() {
        let hosts = vuln_hosts(1);
        let body = vuln_message(&hosts).body().unwrap();

        assert!(body.starts_with(
            "See vulnerability (CVE) details in National Vulnerability Database (NVD) here: \
             [CVE-2024-0001](https://nvd.nist.gov/vuln/detail/CVE-2024-0001).\n\nAffected hosts:"
        ));
        assert!(!body.contains("Probability of exploit"));
        assert!(!body.contains("CVSS score"));
        assert!(!body.contains("Published"));
        assert!(!body.contains("Known exploits"));
        assert!(body.contains("enter \"CVE-2024-0001\""));
        assert!(body.ends_with("created automatically by your Fleet FreeScout integration.\n"));
    }

    #[test]
    fn test_vuln_body_renders_each_metadata_field() {
        let hosts = vuln_hosts(1);
        let mut msg = vuln_message(&hosts);
        msg.epss_probability = Some(0.5);
        msg.cvss_score = Some(7.0);
        msg.cve_published = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        msg.cisa_known_exploit = Some(true);

        let body = msg.body().unwrap();

        assert!(body.contains("(https://www.first.org/epss/)): 0.5\n"));
        assert!(body.contains("CVSS score (reported by [NVD](https://nvd.nist.gov/)): 7\n"));
        assert!(body.contains("Published (reported by [NVD](https://nvd.nist.gov/)): 2024-01-02 03:04:05 +0000 UTC\n"));
        assert!(body.contains("known-exploited-vulnerabilities-catalog)): Yes\n"));
    }

    #[test]
    fn test_cisa_known_exploit_false_renders_no() {
        let hosts = vuln_hosts(1);
        let mut msg = vuln_message(&hosts);
        msg.cisa_known_exploit = Some(false);

        assert!(msg.body().unwrap().contains("known-exploited-vulnerabilities-catalog)): No\n"));
    }

    #[test]
    fn test_vuln_body_nests_non_empty_paths() {
        let hosts = vec![HostVulnerabilitySummary {
            id: 4,
            hostname: "h".to_string(),
            display_name: "Laptop".to_string(),
            software_installed_paths: vec![String::new(), "/usr/lib/libssl.so".to_string()],
        }];

        let body = vuln_message(&hosts).body().unwrap();

        assert!(body.contains("* [Laptop](https://fleet.example.com/hosts/4)\n    * /usr/lib/libssl.so\n"));
        assert!(!body.contains("    * \n"));
    }

    #[test]
    fn test_failing_policy_message() {
        let hosts = vec![
            PolicySetHost { id: 1, hostname: "a".to_string(), display_name: "A".to_string() },
            PolicySetHost { id: 2, hostname: "b".to_string(), display_name: "B".to_string() },
        ];
        let msg = FailingPolicyMessage {
            fleet_url: "https://fleet.example.com",
            policy_id: 5,
            policy_name: "Disk encryption",
            policy_critical: true,
            team_id: Some(12),
            hosts: &hosts,
        };

        let rendered = msg.render().unwrap();

        assert_eq!(rendered.summary, "Disk encryption policy failed on 2 host(s)");
        assert!(rendered.body.starts_with("This policy is marked as **Critical** in Fleet.\n\nHosts:\n\n"));
        assert!(rendered.body.contains("* [B](https://fleet.example.com/hosts/2)\n"));
        assert!(rendered.body.contains(
            "(https://fleet.example.com/hosts/manage/?order_key=hostname&order_direction=asc&team_id=12&policy_id=5&policy_response=failing)"
        ));
    }

    #[test]
    fn test_failing_policy_without_team_or_critical() {
        let hosts: Vec<PolicySetHost> = (1..=55)
            .map(|id| PolicySetHost { id, hostname: format!("h{}", id), display_name: format!("H{}", id) })
            .collect();
        let msg = FailingPolicyMessage {
            fleet_url: "https://fleet.example.com",
            policy_id: 9,
            policy_name: "Firewall",
            policy_critical: false,
            team_id: None,
            hosts: &hosts,
        };

        let body = msg.body().unwrap();

        assert!(body.starts_with("Hosts:\n\n"));
        assert_eq!(body.matches("* [H").count(), 50);
        assert!(body.contains("order_direction=asc&policy_id=9&policy_response=failing"));
        assert!(!body.contains("team_id="));
    }

    #[test]
    fn test_missing_fleet_url_is_template_error() {
        let hosts = vuln_hosts(1);
        let mut msg = vuln_message(&hosts);
        msg.fleet_url = "";

        assert!(matches!(msg.render(), Err(AppError::TemplateError(_))));
    }
}
