//! Static topic buckets for the offline fallback. Data, not logic: each
//! topic carries canned pages keyed by response category.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::PromptCategory;

/// Topics the offline knowledge base has dedicated pages for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topic {
    Docker,
    Kubernetes,
    CiCd,
    Terraform,
    Aws,
    DevOps,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Docker,
        Topic::Kubernetes,
        Topic::CiCd,
        Topic::Terraform,
        Topic::Aws,
        Topic::DevOps,
    ];

    /// Substrings that mark a prompt as being about this topic.
    pub(crate) fn cues(&self) -> &'static [&'static str] {
        match self {
            Topic::Docker => &["docker", "container"],
            Topic::Kubernetes => &["kubernetes", "k8s", "kubectl"],
            Topic::CiCd => &["ci/cd", "ci_cd", "cicd", "pipeline", "continuous integration"],
            Topic::Terraform => &["terraform"],
            Topic::Aws => &["aws", "amazon web services"],
            Topic::DevOps => &["devops"],
        }
    }
}

/// Canned pages for one topic. Missing categories fall back to `overview`.
pub(crate) struct TopicPages {
    explain: Option<&'static str>,
    debug: Option<&'static str>,
    learn: Option<&'static str>,
    design: Option<&'static str>,
    overview: &'static str,
}

impl TopicPages {
    pub(crate) fn page(&self, category: PromptCategory) -> Option<&'static str> {
        match category {
            PromptCategory::Explain => self.explain,
            PromptCategory::Debug => self.debug,
            PromptCategory::Learn => self.learn,
            PromptCategory::Design => self.design,
            // Generate/help/general prompts get the short overview.
            _ => Some(self.overview),
        }
    }
}

pub(crate) static TOPICS: Lazy<BTreeMap<Topic, TopicPages>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    map.insert(
        Topic::Docker,
        TopicPages {
            explain: Some(
                "**Docker: containerization**\n\n\
                 A container ships your code with everything it needs: application, \
                 runtime, dependencies, system libraries. Same container runs on dev, \
                 test and production.\n\n\
                 Key concepts: an *image* is the blueprint, a *container* is a running \
                 instance, a *Dockerfile* builds the image, a *registry* stores and \
                 shares images.\n\n\
                 Quick start: `docker run -d -p 8080:80 nginx` starts a web server \
                 reachable on port 8080.",
            ),
            debug: Some(
                "**Common Docker issues**\n\n\
                 1. \"Cannot connect to Docker daemon\": service not running \
                 (`sudo systemctl start docker`) or missing group membership \
                 (`sudo usermod -aG docker $USER`).\n\
                 2. \"Port already in use\": stop the existing container or map a \
                 different host port.\n\
                 3. Image won't build: check Dockerfile syntax and that the base \
                 image exists (`docker pull <image>`).\n\
                 4. Container exits immediately: check `docker logs <container>`; \
                 usually the app crashed.",
            ),
            learn: Some(
                "**Learning Docker step by step**\n\n\
                 Day 1: install Docker, run `docker run hello-world`, list images.\n\
                 Day 2: write a Dockerfile, `docker build -t myapp .`, run it.\n\
                 Day 3: multi-container apps with Docker Compose.\n\
                 Day 4+: registries, networking, volumes, health checks.",
            ),
            design: Some(
                "**Docker architecture practices**\n\n\
                 Pin base image versions, keep layers small, use multi-stage builds, \
                 include health checks. Prefer minimal bases (Alpine, distroless). \
                 Don't run as root; scan images; set resource limits.",
            ),
            overview: "Docker is a containerization platform. Ask to explain, debug or \
                       design around containers.",
        },
    );
    map.insert(
        Topic::Kubernetes,
        TopicPages {
            explain: Some(
                "**Kubernetes: container orchestration**\n\n\
                 Kubernetes deploys containers, restarts failed ones, scales with \
                 demand and rolls out updates without downtime.\n\n\
                 Key concepts: a *Pod* is the smallest deployable unit, a *Deployment* \
                 manages pod replicas, a *Service* exposes pods to the network, a \
                 *Namespace* partitions the cluster.",
            ),
            debug: Some(
                "**Common Kubernetes issues**\n\n\
                 1. CrashLoopBackOff: app keeps crashing — `kubectl logs <pod>`.\n\
                 2. ImagePullBackOff: image name or registry credentials — \
                 `kubectl describe pod <pod>`.\n\
                 3. Service unreachable: selector must match pod labels; verify the \
                 service type.\n\
                 4. Node NotReady: check `kubectl describe node` and kubelet status.",
            ),
            learn: Some(
                "**Learning Kubernetes**\n\n\
                 Week 1: pods, deployments, services on a local cluster (minikube or \
                 kind). Week 2: ConfigMaps, Secrets, persistent volumes. Week 3: \
                 networking and ingress. Week 4+: Helm, monitoring, security policies.",
            ),
            design: Some(
                "**Kubernetes architecture practices**\n\n\
                 Declarative manifests under version control; separate namespaces per \
                 environment. Always set resource requests/limits; use autoscaling and \
                 disruption budgets. Multi-replica deployments with anti-affinity and \
                 readiness/liveness probes.",
            ),
            overview: "Kubernetes orchestrates containers at scale. Ask to explain, \
                       debug or design K8s workloads.",
        },
    );
    map.insert(
        Topic::CiCd,
        TopicPages {
            explain: Some(
                "**CI/CD: continuous integration and deployment**\n\n\
                 CI runs tests and builds artifacts on every push; CD promotes passing \
                 builds through staging to production automatically. Benefits: bugs \
                 caught early, faster releases, consistent deployments, rollback.\n\n\
                 Common tools: GitHub Actions, GitLab CI, Jenkins; ArgoCD or \
                 Spinnaker for deployment.",
            ),
            debug: Some(
                "**Common CI/CD issues**\n\n\
                 Build failures: read the test logs, verify dependencies and \
                 environment variables. Deployment failures: permissions, missing \
                 secrets, image not pushed, failing health checks. Slow pipelines: \
                 parallelize tests, cache dependencies, trim Docker builds.",
            ),
            learn: Some(
                "**Getting started with CI/CD**\n\n\
                 1. Source control with a branch strategy.\n\
                 2. Add a pipeline file with test and build stages.\n\
                 3. Add a deploy stage: staging first, manual approval for production.\n\
                 4. Mature with security scanning and automated rollback.",
            ),
            design: None,
            overview: "CI/CD automates testing and deployment. Ask to explain, debug \
                       or set up a pipeline.",
        },
    );
    map.insert(
        Topic::Terraform,
        TopicPages {
            explain: Some(
                "**Terraform: infrastructure as code**\n\n\
                 Declare VMs, databases and networks in versioned `.tf` files. \
                 Declarative and idempotent: describe the target state, apply it \
                 safely any number of times, replicate it across environments.",
            ),
            debug: None,
            learn: None,
            design: None,
            overview: "Terraform manages infrastructure as code. Ask about specific \
                       resources or concepts.",
        },
    );
    map.insert(
        Topic::Aws,
        TopicPages {
            explain: Some(
                "**AWS core services**\n\n\
                 EC2 for compute, S3 for object storage, RDS for managed databases, \
                 Lambda for serverless, VPC for networking. DevOps side: \
                 CodePipeline, CloudFormation, ECS/EKS, CloudWatch.",
            ),
            debug: None,
            learn: None,
            design: None,
            overview: "AWS is a cloud platform. Ask about a specific service.",
        },
    );
    map.insert(
        Topic::DevOps,
        TopicPages {
            explain: Some(
                "**DevOps: culture and practices**\n\n\
                 Collaboration between development and operations, automation of \
                 repetitive work, measurement of everything, shared tooling. Core \
                 practices: CI/CD, infrastructure as code, observability, incident \
                 response.",
            ),
            debug: None,
            learn: None,
            design: None,
            overview: "DevOps is a culture of automation and collaboration. Ask about \
                       specific practices.",
        },
    );
    map
});
