//! Built-in sample collections served when no backend is reachable.
//!
//! The dataset is immutable for the life of the process.

use std::sync::{Arc, LazyLock};

use serde_json::{Value, json};

use crate::types::{Chunk, Collection, Metadata};

/// A fixed collection of chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCollection {
    pub id: String,
    pub name: String,
    pub metadata: Metadata,
    pub chunks: Vec<Chunk>,
}

impl FixtureCollection {
    /// Describe this collection; the count is derived from the chunk list.
    pub fn describe(&self) -> Collection {
        Collection {
            id: self.id.clone(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            count: self.chunks.len(),
        }
    }
}

/// An ordered set of fixture collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureDataset {
    collections: Vec<FixtureCollection>,
}

static BUILTIN: LazyLock<Arc<FixtureDataset>> = LazyLock::new(|| {
    Arc::new(FixtureDataset::new(vec![
        collection(
            "demo-col-001",
            "ai-agent-memories",
            "Personal AI agent long-term memory store",
            agent_memories(),
        ),
        collection(
            "demo-col-002",
            "knowledge-base",
            "Technical knowledge base and documentation",
            knowledge_base(),
        ),
    ]))
});

impl FixtureDataset {
    pub fn new(collections: Vec<FixtureCollection>) -> Self {
        Self { collections }
    }

    /// The shared built-in dataset.
    pub fn builtin() -> Arc<FixtureDataset> {
        Arc::clone(&BUILTIN)
    }

    /// Collections in their fixed order.
    pub fn collections(&self) -> &[FixtureCollection] {
        &self.collections
    }

    /// Look a collection up by its name.
    pub fn by_name(&self, name: &str) -> Option<&FixtureCollection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Look a collection up by id, falling back to name.
    pub fn by_ref(&self, collection_ref: &str) -> Option<&FixtureCollection> {
        self.collections
            .iter()
            .find(|c| c.id == collection_ref)
            .or_else(|| self.by_name(collection_ref))
    }
}

fn collection(id: &str, name: &str, description: &str, chunks: Vec<Chunk>) -> FixtureCollection {
    FixtureCollection {
        id: id.to_string(),
        name: name.to_string(),
        metadata: object(json!({ "description": description })),
        chunks,
    }
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

fn memory(id: &str, document: &str, source: &str, timestamp: &str, tags: &str, importance: f64) -> Chunk {
    Chunk {
        id: id.to_string(),
        document: document.to_string(),
        metadata: object(json!({
            "source": source,
            "timestamp": timestamp,
            "tags": tags,
            "importance": importance,
        })),
        embedding: None,
    }
}

fn article(id: &str, document: &str, source: &str, timestamp: &str, tags: &str, category: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        document: document.to_string(),
        metadata: object(json!({
            "source": source,
            "timestamp": timestamp,
            "tags": tags,
            "category": category,
        })),
        embedding: None,
    }
}

fn agent_memories() -> Vec<Chunk> {
    vec![
        memory("mem-001", "User prefers dark mode across all applications. Confirmed multiple times.", "dm:preferences", "2025-01-15T10:23:00Z", "preference,ui", 0.8),
        memory("mem-002", "Had a detailed conversation about setting up a home Kubernetes cluster. User runs k3s on 3 Raspberry Pi 5 nodes.", "session:homelab", "2025-01-14T16:45:00Z", "homelab,kubernetes,raspberrypi", 0.9),
        memory("mem-003", "User asked me to always respond in Portuguese when the conversation starts in Portuguese.", "dm:language", "2025-01-13T09:12:00Z", "preference,language", 0.95),
        memory("mem-004", "Decided to use ChromaDB as the primary vector store for long-term memory. Deployed via Docker on the homelab.", "session:architecture", "2025-01-12T14:30:00Z", "architecture,chromadb,decision", 0.85),
        memory("mem-005", "User works as a software engineer, primarily with TypeScript, Python, and Go. Strong preference for clean, minimal code.", "dm:profile", "2025-01-11T08:00:00Z", "profile,skills", 0.9),
        memory("mem-006", "Morning routine: user checks messages between 8-9am Lisbon time. Best time for non-urgent updates.", "session:scheduling", "2025-01-10T08:15:00Z", "routine,scheduling", 0.6),
        memory("mem-007", "Migrated all memory chunks from markdown files to ChromaDB. 67 chunks indexed successfully using nomic-embed-text embeddings.", "session:migration", "2025-01-09T20:00:00Z", "migration,chromadb,task", 0.7),
        memory("mem-008", "User has a cat named Pixel who sometimes walks across the keyboard during coding sessions.", "dm:personal", "2025-01-08T22:10:00Z", "personal,fun", 0.3),
        memory("mem-009", "Task completed: Set up Tailscale mesh VPN across all homelab nodes. All devices can now reach each other via tailnet hostnames.", "session:homelab", "2025-01-07T17:30:00Z", "homelab,networking,tailscale,task", 0.75),
        memory("mem-010", "User prefers Bun over Node.js for TypeScript execution. Use pnpm for package management.", "dm:preferences", "2025-01-06T11:20:00Z", "preference,tooling", 0.8),
        memory("mem-011", "Discussed the pros and cons of RAG vs fine-tuning for personal AI assistants. Concluded RAG with good chunking is more practical.", "session:ai-discussion", "2025-01-05T15:45:00Z", "ai,rag,architecture,discussion", 0.85),
        memory("mem-012", r#"WhatsApp group "Candelabros" requires responding to ALL messages (requireMention: false). Other groups need @mention."#, "session:config", "2025-01-04T10:00:00Z", "config,whatsapp,groups", 0.9),
        memory("mem-013", "User birthday is March 22. Likes minimalist gifts, good coffee, and tech gadgets.", "dm:personal", "2025-01-03T19:30:00Z", "personal,birthday", 0.5),
        memory("mem-014", "Resolved embedding dimension mismatch: ChromaDB collection expected 384 dims but Ollama nomic-embed-text generates 768. Recreated collection with correct dimensions.", "session:bugfix", "2025-01-02T21:15:00Z", "bugfix,embeddings,chromadb", 0.7),
        memory("mem-015", "User runs Ollama locally for embeddings and small model inference. GPU: Apple M2 Pro with 32GB unified memory.", "session:hardware", "2025-01-01T12:00:00Z", "hardware,ollama,profile", 0.75),
        memory("mem-016", "Preference: when writing commit messages, use conventional commit format with short, action-oriented descriptions.", "dm:preferences", "2024-12-30T14:20:00Z", "preference,git,workflow", 0.7),
        memory("mem-017", "Deployed VectorLens (ChromaDB viewer) to Vercel. Needs demo mode for when no backend is connected.", "session:deployment", "2024-12-29T16:00:00Z", "vectorlens,deployment,vercel,task", 0.65),
        memory("mem-018", "User timezone is Europe/Lisbon (WET/WEST). Always use this for scheduling and time references.", "dm:preferences", "2024-12-28T09:00:00Z", "preference,timezone", 0.9),
        memory("mem-019", "Group conversation about weekend hiking plans near Sintra. User enjoys outdoor activities on weekends.", "group:cavalheiros", "2024-12-27T20:45:00Z", "personal,hobbies,social", 0.3),
        memory("mem-020", "Implemented a proxy server for ChromaDB that adds semantic search, timeline, duplicates detection, and graph visualization endpoints.", "session:development", "2024-12-26T18:30:00Z", "development,chromadb,proxy,task", 0.8),
    ]
}

fn knowledge_base() -> Vec<Chunk> {
    vec![
        article("kb-001", "ChromaDB is an open-source embedding database designed for AI applications. It supports persistent storage, metadata filtering, and multiple embedding functions. Default API runs on port 8000.", "docs:chromadb", "2025-01-10T00:00:00Z", "chromadb,database,reference", "infrastructure"),
        article("kb-002", "Retrieval-Augmented Generation (RAG) combines a retrieval system with a generative model. Documents are chunked, embedded, and stored in a vector database. At query time, relevant chunks are retrieved and fed as context to the LLM.", "docs:rag", "2025-01-09T00:00:00Z", "rag,ai,architecture", "concepts"),
        article("kb-003", "Tailscale is a zero-config mesh VPN built on WireGuard. It creates a secure network (tailnet) between devices. Key features: MagicDNS, ACL policies, subnet routing, and exit nodes.", "docs:tailscale", "2025-01-08T00:00:00Z", "tailscale,networking,vpn", "infrastructure"),
        article("kb-004", "k3s is a lightweight Kubernetes distribution by Rancher. It bundles all components into a single binary under 100MB. Ideal for edge, IoT, and homelab deployments. Supports ARM64 natively.", "docs:kubernetes", "2025-01-07T00:00:00Z", "kubernetes,k3s,homelab", "infrastructure"),
        article("kb-005", "Ollama runs large language models locally. Supports model pulling, serving via REST API on port 11434, and embedding generation. Popular models: llama3, mistral, nomic-embed-text.", "docs:ollama", "2025-01-06T00:00:00Z", "ollama,llm,local-ai", "tools"),
        article("kb-006", "Cosine similarity measures the angle between two vectors. Values range from -1 to 1, where 1 means identical direction. In ChromaDB, distances are often returned as 1 - cosine_similarity, so lower values mean more similar.", "docs:embeddings", "2025-01-05T00:00:00Z", "embeddings,math,similarity", "concepts"),
        article("kb-007", "Vite is a next-generation frontend build tool. It uses native ES modules for development and Rollup for production builds. Key features: instant HMR, TypeScript support out of the box, and plugin ecosystem.", "docs:vite", "2025-01-04T00:00:00Z", "vite,frontend,tooling", "tools"),
        article("kb-008", "Docker Compose defines multi-container applications in a YAML file. Use `docker compose up -d` to start services. Volumes persist data, networks isolate communication. Health checks ensure readiness.", "docs:docker", "2025-01-03T00:00:00Z", "docker,containers,deployment", "infrastructure"),
        article("kb-009", "WebSockets provide full-duplex communication over a single TCP connection. The protocol starts with an HTTP upgrade handshake. Useful for real-time applications like chat, notifications, and live data feeds.", "docs:websockets", "2025-01-02T00:00:00Z", "websockets,networking,realtime", "concepts"),
        article("kb-010", "Vercel deploys frontend applications with zero configuration. It supports automatic previews for PRs, edge functions, and serverless API routes. Framework detection auto-configures build settings for Vite, Next.js, etc.", "docs:vercel", "2025-01-01T00:00:00Z", "vercel,deployment,hosting", "tools"),
    ]
}
